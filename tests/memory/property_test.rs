/*!
 * Property Tests
 * Partition and coalescing invariants over random operation sequences
 */

use memory_space::memory::{MemoryBlock, MemoryError, MemorySpace};
use proptest::prelude::*;

const SPACE: usize = 256;

#[derive(Debug, Clone)]
enum Op {
    Malloc(isize),
    /// Free the n-th live allocation (modulo the live count)
    Free(usize),
    /// Free an address that may or may not be allocated
    FreeRaw(usize),
    Defrag,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-2isize..64).prop_map(Op::Malloc),
        3 => any::<usize>().prop_map(Op::Free),
        1 => (0..SPACE).prop_map(Op::FreeRaw),
        1 => Just(Op::Defrag),
    ]
}

fn all_blocks(space: &MemorySpace) -> Vec<MemoryBlock> {
    space
        .free_blocks()
        .values()
        .chain(space.allocated_blocks().values())
        .copied()
        .collect()
}

fn assert_partition(space: &MemorySpace) {
    let mut blocks = all_blocks(space);
    let total: usize = blocks.iter().map(|b| b.size).sum();
    assert_eq!(total, SPACE);

    blocks.sort_by_key(|b| b.address);
    let mut expected = 0;
    for block in &blocks {
        assert!(block.size > 0, "empty block {:?}", block);
        assert_eq!(block.address, expected, "gap or overlap at {:?}", block);
        expected = block.end();
    }
    assert_eq!(expected, SPACE);
}

fn assert_coalesced(space: &MemorySpace) {
    let free: Vec<MemoryBlock> = space.free_blocks().values().copied().collect();
    for pair in free.windows(2) {
        assert!(pair[0].address < pair[1].address, "unsorted: {:?}", free);
        assert!(!pair[0].is_adjacent_to(&pair[1]), "mergeable: {:?}", free);
    }
}

proptest! {
    #[test]
    fn prop_blocks_always_partition_space(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let mut space = MemorySpace::new(SPACE);
        let mut live: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                Op::Malloc(length) => {
                    let before = space.snapshot();
                    match space.malloc(length) {
                        Ok(address) => live.push(address),
                        Err(MemoryError::InvalidRequest { .. }) => {
                            prop_assert!(length <= 0);
                            prop_assert_eq!(space.snapshot(), before);
                        }
                        Err(MemoryError::OutOfMemory { largest_free, .. }) => {
                            prop_assert!(largest_free < length as usize);
                            prop_assert_eq!(space.snapshot(), before);
                        }
                        Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                    }
                }
                Op::Free(n) if !live.is_empty() => {
                    let address = live.remove(n % live.len());
                    prop_assert!(space.free(address).is_ok());
                    assert_coalesced(&space);
                }
                Op::Free(_) => {}
                Op::FreeRaw(address) => {
                    let before = space.snapshot();
                    match space.free(address) {
                        Ok(()) => {
                            prop_assert!(live.contains(&address));
                            live.retain(|&a| a != address);
                        }
                        Err(e) => {
                            prop_assert_eq!(e, MemoryError::InvalidAddress(address));
                            prop_assert_eq!(space.snapshot(), before);
                        }
                    }
                }
                Op::Defrag => {
                    space.defrag();
                    assert_coalesced(&space);
                }
            }
            assert_partition(&space);
        }
    }

    #[test]
    fn prop_defrag_is_idempotent(sizes in prop::collection::vec(1isize..32, 1..16), frees in prop::collection::vec(any::<bool>(), 16)) {
        let mut space = MemorySpace::new(SPACE);
        let addresses: Vec<usize> = sizes.iter().filter_map(|&s| space.malloc(s).ok()).collect();
        for (address, free) in addresses.iter().zip(frees) {
            if free {
                space.free(*address).unwrap();
            }
        }

        space.defrag();
        let first = space.snapshot();
        prop_assert_eq!(space.defrag(), 0);
        prop_assert_eq!(space.snapshot(), first);
    }

    #[test]
    fn prop_isolated_round_trip(length in 1isize..=SPACE as isize) {
        let mut space = MemorySpace::new(SPACE);
        let before = space.snapshot();

        let address = space.malloc(length).unwrap();
        space.free(address).unwrap();
        space.defrag();

        prop_assert_eq!(space.snapshot(), before);
    }
}
