/*!
 * Memory Space Tests
 * Allocation, deallocation and error handling through the public API
 */

use memory_space::memory::{
    Allocator, Defragment, MemoryBlock, MemoryConfig, MemoryError, MemoryInfo, MemoryPressure,
    MemorySpace,
};
use pretty_assertions::assert_eq;

fn free_list(space: &MemorySpace) -> Vec<(usize, usize)> {
    space
        .free_blocks()
        .values()
        .map(|b| (b.address, b.size))
        .collect()
}

#[test]
fn test_memory_space_initialization() {
    let space = MemorySpace::new(1024);
    let (total, used, available) = space.info();

    assert_eq!(total, 1024);
    assert_eq!(used, 0);
    assert_eq!(available, total);
    assert_eq!(free_list(&space), vec![(0, 1024)]);
    assert!(space.allocated_blocks().is_empty());
}

#[test]
fn test_default_space_uses_default_config() {
    let space = MemorySpace::default();
    assert_eq!(space.config(), MemoryConfig::default());
    assert_eq!(space.max_size(), 1024);
}

#[test]
fn test_zero_sized_space_rejects_everything() {
    let mut space = MemorySpace::new(0);

    assert!(space.free_blocks().is_empty());
    assert_eq!(
        space.malloc(1),
        Err(MemoryError::OutOfMemory {
            requested: 1,
            largest_free: 0,
            available: 0,
        })
    );
}

#[test]
fn test_sequential_allocations_are_contiguous() {
    let mut space = MemorySpace::new(100);

    assert_eq!(space.malloc(10), Ok(0));
    assert_eq!(space.malloc(20), Ok(10));
    assert_eq!(space.malloc(30), Ok(30));

    let (_, used, available) = space.info();
    assert_eq!(used, 60);
    assert_eq!(available, 40);
    assert_eq!(free_list(&space), vec![(60, 40)]);
}

#[test]
fn test_allocated_list_keeps_insertion_order() {
    let mut space = MemorySpace::new(20);
    let a = space.malloc(5).unwrap();
    let b = space.malloc(5).unwrap();
    space.free(a).unwrap();
    let c = space.malloc(3).unwrap();

    let allocated: Vec<MemoryBlock> = space.allocated_blocks().values().copied().collect();
    assert_eq!(
        allocated,
        vec![MemoryBlock::new(b, 5), MemoryBlock::new(c, 3)]
    );
    assert_eq!(c, 0);
}

#[test]
fn test_free_on_empty_allocated_list() {
    let mut space = MemorySpace::new(10);
    assert_eq!(space.free(0), Err(MemoryError::InvalidAddress(0)));
    assert_eq!(free_list(&space), vec![(0, 10)]);
}

#[test]
fn test_free_requires_base_address() {
    let mut space = MemorySpace::new(10);
    let a = space.malloc(5).unwrap();

    // Inside the block but not its base
    assert_eq!(space.free(a + 1), Err(MemoryError::InvalidAddress(a + 1)));
    assert!(space.is_valid(a));
}

#[test]
fn test_request_larger_than_space() {
    let mut space = MemorySpace::new(10);
    assert_eq!(
        space.malloc(11),
        Err(MemoryError::OutOfMemory {
            requested: 11,
            largest_free: 10,
            available: 10,
        })
    );
}

#[test]
fn test_allocator_trait_object() {
    let mut space = MemorySpace::new(64);
    let allocator: &mut dyn Allocator = &mut space;

    let addr = allocator.malloc(16).unwrap();
    assert_eq!(allocator.block_size(addr), Some(16));
    allocator.free(addr).unwrap();
    assert!(!allocator.is_valid(addr));
}

#[test]
fn test_defragment_trait_reports_merges() {
    let mut space = MemorySpace::new(10);
    space.malloc(10).unwrap();
    assert_eq!(Defragment::defrag(&mut space), 0);
}

#[test]
fn test_stats_and_pressure() {
    let mut space = MemorySpace::new(100);
    space.malloc(50).unwrap();
    space.malloc(35).unwrap();

    let stats = space.stats();
    assert_eq!(stats.total_memory, 100);
    assert_eq!(stats.used_memory, 85);
    assert_eq!(stats.available_memory, 15);
    assert_eq!(stats.allocated_blocks, 2);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.largest_free_block, 15);
    assert_eq!(stats.fragmented_memory(), 0);
    assert_eq!(space.pressure(), MemoryPressure::High);
}

#[test]
fn test_configured_thresholds_drive_pressure() {
    let config = MemoryConfig {
        max_size: 100,
        warning_threshold: 0.3,
        critical_threshold: 0.5,
    };
    let mut space = MemorySpace::with_config(config);

    space.malloc(40).unwrap();
    assert_eq!(space.pressure(), MemoryPressure::High);
    space.malloc(10).unwrap();
    assert_eq!(space.pressure(), MemoryPressure::Critical);
}

#[test]
fn test_error_messages() {
    assert_eq!(
        MemoryError::InvalidRequest { length: -1 }.to_string(),
        "Invalid allocation request: length must be positive, got -1"
    );
    assert_eq!(
        MemoryError::InvalidAddress(42).to_string(),
        "Invalid memory address: 42"
    );
}
