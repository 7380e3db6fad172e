/*!
 * Free List Defragmentation
 * Coalescing of address-adjacent free blocks
 */

use super::MemorySpace;
use crate::memory::types::MemoryBlock;
use log::info;

impl MemorySpace {
    /// Sort the free list by address and merge address-adjacent blocks
    ///
    /// Afterwards the free list is ascending by address and no two entries
    /// touch. Running it again without an intervening malloc or free changes
    /// nothing. Returns the number of merges performed.
    pub fn defrag(&mut self) -> usize {
        if self.free_blocks.len() <= 1 {
            return 0;
        }

        // Stable sort; base addresses are unique while the lists partition the space
        let mut sorted: Vec<MemoryBlock> = self.free_blocks.values().copied().collect();
        sorted.sort_by_key(|block| block.address);

        let before = sorted.len();
        let mut merged: Vec<MemoryBlock> = Vec::with_capacity(before);
        for block in sorted {
            match merged.last_mut() {
                Some(current) if current.is_adjacent_to(&block) => current.size += block.size,
                _ => merged.push(block),
            }
        }

        let coalesced_count = before - merged.len();
        if coalesced_count > 0 {
            info!(
                "Coalesced {} pairs of adjacent free blocks, reduced from {} to {} blocks",
                coalesced_count,
                before,
                merged.len()
            );
        }

        self.free_blocks = merged.into_iter().collect();
        coalesced_count
    }
}
