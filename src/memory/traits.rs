/*!
 * Memory Traits
 * Memory management abstractions
 */

use super::types::*;
use crate::core::types::{Address, RequestSize, Size};

/// Memory allocator interface
pub trait Allocator {
    /// Allocate a block of `length` words and return its base address
    fn malloc(&mut self, length: RequestSize) -> MemoryResult<Address>;

    /// Release the block whose base address is `address`
    fn free(&mut self, address: Address) -> MemoryResult<()>;

    /// Check if an address is the base of an allocated block
    fn is_valid(&self, address: Address) -> bool;

    /// Get the size of an allocated block
    fn block_size(&self, address: Address) -> Option<Size>;
}

/// Free-space compaction
pub trait Defragment {
    /// Merge address-adjacent free blocks, returning the number of merges
    fn defrag(&mut self) -> usize;
}

/// Memory statistics provider
pub trait MemoryInfo {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryStats;

    /// Get memory info as (total, used, available)
    fn info(&self) -> (Size, Size, Size);

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}
