/*!
 * Fragmentation Tests
 * First-fit placement, coalescing and fragmentation scenarios
 */

use memory_space::memory::{MemoryBlock, MemoryError, MemorySnapshot, MemorySpace};
use pretty_assertions::assert_eq;

fn free_list(space: &MemorySpace) -> Vec<(usize, usize)> {
    space
        .free_blocks()
        .values()
        .map(|b| (b.address, b.size))
        .collect()
}

#[test]
fn test_fragmented_free_space_cannot_serve_larger_request() {
    let mut space = MemorySpace::new(10);
    assert_eq!(space.malloc(4), Ok(0));
    assert_eq!(space.malloc(4), Ok(4));
    assert_eq!(space.malloc(2), Ok(8));
    assert!(space.free_blocks().is_empty());

    space.free(4).unwrap();
    let before = space.snapshot();

    assert!(matches!(
        space.malloc(5),
        Err(MemoryError::OutOfMemory { requested: 5, .. })
    ));
    assert_eq!(space.snapshot(), before);
}

#[test]
fn test_adjacent_frees_coalesce_into_one_block() {
    let mut space = MemorySpace::new(10);
    assert_eq!(space.malloc(3), Ok(0));
    assert_eq!(space.malloc(3), Ok(3));
    assert_eq!(space.malloc(4), Ok(6));

    space.free(0).unwrap();
    space.free(3).unwrap();
    space.defrag();

    assert_eq!(free_list(&space), vec![(0, 6)]);
    assert_eq!(space.malloc(6), Ok(0));
}

#[test]
fn test_first_fit_follows_list_order() {
    let mut space = MemorySpace::restore(MemorySnapshot {
        free: vec![MemoryBlock::new(100, 5), MemoryBlock::new(0, 50)],
        allocated: vec![MemoryBlock::new(50, 50)],
    })
    .unwrap();

    // (100, 5) comes first in the list and is an exact fit
    assert_eq!(space.malloc(5), Ok(100));
    assert_eq!(free_list(&space), vec![(0, 50)]);
}

#[test]
fn test_first_fit_is_not_best_fit() {
    let mut space = MemorySpace::restore(MemorySnapshot {
        free: vec![MemoryBlock::new(0, 50), MemoryBlock::new(100, 5)],
        allocated: vec![MemoryBlock::new(50, 50)],
    })
    .unwrap();

    // The tighter (100, 5) block is ignored because (0, 50) comes first
    assert_eq!(space.malloc(5), Ok(0));
    assert_eq!(free_list(&space), vec![(5, 45), (100, 5)]);
}

#[test]
fn test_malloc_free_round_trip_restores_free_list() {
    let mut space = MemorySpace::new(64);
    let keep = space.malloc(8).unwrap();
    let before = free_list(&space);

    let addr = space.malloc(16).unwrap();
    space.free(addr).unwrap();
    space.defrag();

    assert_eq!(free_list(&space), before);
    assert!(space.is_valid(keep));
}

#[test]
fn test_freeing_middle_block_merges_both_neighbours() {
    let mut space = MemorySpace::new(30);
    let a = space.malloc(10).unwrap();
    let b = space.malloc(10).unwrap();
    let c = space.malloc(10).unwrap();

    space.free(a).unwrap();
    space.free(c).unwrap();
    assert_eq!(free_list(&space), vec![(0, 10), (20, 10)]);

    space.free(b).unwrap();
    assert_eq!(free_list(&space), vec![(0, 30)]);
}

#[test]
fn test_restore_rejects_invalid_layouts() {
    let gap = MemorySpace::restore(MemorySnapshot {
        free: vec![MemoryBlock::new(0, 5)],
        allocated: vec![MemoryBlock::new(6, 4)],
    });
    assert!(matches!(gap, Err(MemoryError::InvalidLayout(_))));

    let overlap = MemorySpace::restore(MemorySnapshot {
        free: vec![MemoryBlock::new(0, 5)],
        allocated: vec![MemoryBlock::new(4, 4)],
    });
    assert!(matches!(overlap, Err(MemoryError::InvalidLayout(_))));

    let empty_block = MemorySpace::restore(MemorySnapshot {
        free: vec![MemoryBlock::new(0, 0)],
        allocated: vec![],
    });
    assert!(matches!(empty_block, Err(MemoryError::InvalidLayout(_))));
}

#[test]
fn test_restore_rejects_blocks_past_end_of_address_space() {
    let snapshot = MemorySnapshot {
        free: vec![MemoryBlock::new(0, usize::MAX), MemoryBlock::new(usize::MAX, 1)],
        allocated: vec![],
    };

    let direct = MemorySpace::restore(snapshot.clone());
    assert!(matches!(direct, Err(MemoryError::InvalidLayout(_))));

    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: MemorySnapshot = serde_json::from_str(&json).unwrap();
    let from_json = MemorySpace::restore(decoded);
    assert!(matches!(from_json, Err(MemoryError::InvalidLayout(_))));
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let mut space = MemorySpace::new(32);
    space.malloc(4).unwrap();
    let b = space.malloc(4).unwrap();
    space.malloc(4).unwrap();
    space.free(b).unwrap();

    let json = serde_json::to_string(&space.snapshot()).unwrap();
    let snapshot: MemorySnapshot = serde_json::from_str(&json).unwrap();
    let restored = MemorySpace::restore(snapshot).unwrap();

    assert_eq!(restored.snapshot(), space.snapshot());
    assert_eq!(restored.max_size(), 32);
}
