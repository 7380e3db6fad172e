/*!
 * Memory Space Statistics
 */

use super::MemorySpace;
use crate::core::types::Size;
use crate::memory::types::MemoryStats;

impl MemorySpace {
    /// Words currently handed out
    pub fn used_memory(&self) -> Size {
        self.allocated_blocks.values().map(|block| block.size).sum()
    }

    /// Words currently free, regardless of fragmentation
    pub fn available_memory(&self) -> Size {
        self.free_blocks.values().map(|block| block.size).sum()
    }

    /// Largest request that can currently succeed
    pub fn largest_free_block(&self) -> Size {
        self.free_blocks
            .values()
            .map(|block| block.size)
            .max()
            .unwrap_or(0)
    }

    pub fn stats(&self) -> MemoryStats {
        let used = self.used_memory();

        MemoryStats {
            total_memory: self.max_size,
            used_memory: used,
            available_memory: self.available_memory(),
            usage_percentage: self.usage_ratio(used) * 100.0,
            allocated_blocks: self.allocated_blocks.len(),
            free_blocks: self.free_blocks.len(),
            largest_free_block: self.largest_free_block(),
        }
    }

    /// Memory info as (total, used, available)
    pub fn info(&self) -> (Size, Size, Size) {
        (self.max_size, self.used_memory(), self.available_memory())
    }
}
