/*!
 * Memory Allocator Implementation
 * Allocation and deallocation logic
 */

use super::MemorySpace;
use crate::core::data_structures::BlockListError;
use crate::core::types::{Address, RequestSize, Size};
use crate::memory::types::{MemoryBlock, MemoryError, MemoryPressure, MemoryResult};
use log::{debug, info, warn};

impl MemorySpace {
    /// Allocate `length` words using first-fit over the free list
    ///
    /// The first free block (in list order) that is large enough is used,
    /// even when a tighter fit exists further down the list. The block keeps
    /// its position in the free list and shrinks from the front; an exact fit
    /// removes it. On any error the space is left untouched.
    pub fn malloc(&mut self, length: RequestSize) -> MemoryResult<Address> {
        if length <= 0 {
            warn!("Rejected allocation request of {} words", length);
            return Err(MemoryError::InvalidRequest { length });
        }
        let size = length as Size;

        let (handle, free_block) = match self
            .free_blocks
            .iter()
            .find(|(_, block)| block.size >= size)
        {
            Some((handle, block)) => (handle, *block),
            None => {
                let available = self.available_memory();
                let largest_free = self.largest_free_block();
                warn!(
                    "OOM: requested {} words, largest free block is {} words ({} words free across {} blocks)",
                    size,
                    largest_free,
                    available,
                    self.free_blocks.len()
                );
                return Err(MemoryError::OutOfMemory {
                    requested: size,
                    largest_free,
                    available,
                });
            }
        };

        let address = free_block.address;

        if free_block.size == size {
            self.free_blocks.remove(handle)?;
            debug!(
                "Exact fit: free block ({} , {}) consumed entirely",
                address, size
            );
        } else {
            let block = self
                .free_blocks
                .get_mut(handle)
                .ok_or(BlockListError::StaleHandle)?;
            block.address += size;
            block.size -= size;
            debug!(
                "Split block: allocated {} words at {}, {} words remain free at {}",
                size, address, block.size, block.address
            );
        }

        self.allocated_blocks
            .push_back(MemoryBlock::new(address, size));

        let used = self.used_memory();
        if let Some(level) = self.check_memory_pressure(used) {
            warn!(
                "Memory pressure {}: allocated {} words at {} ({:.1}% used: {} / {})",
                level,
                size,
                address,
                self.usage_ratio(used) * 100.0,
                used,
                self.max_size
            );
        } else {
            info!("Allocated {} words at {}", size, address);
        }

        Ok(address)
    }

    /// Release the block whose base address is `address`
    ///
    /// The block moves unchanged to the tail of the free list and a full
    /// defrag pass follows. Unknown addresses, including blocks that were
    /// already freed, are rejected without touching either list.
    pub fn free(&mut self, address: Address) -> MemoryResult<()> {
        let block = match self
            .allocated_blocks
            .values()
            .find(|block| block.address == address)
        {
            Some(block) => *block,
            None => {
                warn!(
                    "Attempted to free invalid or already freed address: {}",
                    address
                );
                return Err(MemoryError::InvalidAddress(address));
            }
        };

        self.allocated_blocks.remove_value(&block)?;
        self.free_blocks.push_back(block);

        info!(
            "Freed {} words at {} ({} words now available)",
            block.size,
            address,
            self.available_memory()
        );

        self.defrag();
        Ok(())
    }

    /// Check if an address is the base of an allocated block
    pub fn is_valid(&self, address: Address) -> bool {
        self.block_size(address).is_some()
    }

    /// Get the size of the allocated block starting at `address`
    pub fn block_size(&self, address: Address) -> Option<Size> {
        self.allocated_blocks
            .values()
            .find(|block| block.address == address)
            .map(|block| block.size)
    }

    /// Check memory pressure level
    pub(super) fn check_memory_pressure(&self, used: Size) -> Option<MemoryPressure> {
        let usage_ratio = self.usage_ratio(used);

        if usage_ratio >= self.critical_threshold {
            Some(MemoryPressure::Critical)
        } else if usage_ratio >= self.warning_threshold {
            Some(MemoryPressure::High)
        } else {
            None
        }
    }

    pub(super) fn usage_ratio(&self, used: Size) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }
        used as f64 / self.max_size as f64
    }
}
