/*!
 * Memory Space
 *
 * First-fit allocator over a simulated address space `[0, max_size)`.
 *
 * ## Bookkeeping
 *
 * Two block lists partition the address space at all times:
 * - **Free list**: ranges available for allocation, kept in whatever order
 *   the allocation history left them (sorted only right after a defrag)
 * - **Allocated list**: ranges handed out to callers, in allocation order
 *
 * ## Features
 *
 * - **First fit**: the first free block large enough wins, in list order
 * - **Block splitting**: the chosen free block shrinks from the front; an
 *   exact fit consumes it entirely
 * - **Coalescing**: every successful free sorts the free list and merges
 *   address-adjacent blocks
 * - **Memory pressure tracking**: warns at 80%, critical at 95% (configurable)
 */

mod allocator;
mod defrag;
mod stats;

use super::traits::{Allocator, Defragment, MemoryInfo};
use super::types::{
    MemoryBlock, MemoryConfig, MemoryError, MemoryPressure, MemoryResult, MemoryStats,
};
use crate::core::data_structures::BlockList;
use crate::core::types::{Address, RequestSize, Size};
use log::info;
use serde::{Deserialize, Serialize};

/// Memory space
#[derive(Debug, Clone)]
pub struct MemorySpace {
    free_blocks: BlockList<MemoryBlock>,
    allocated_blocks: BlockList<MemoryBlock>,
    max_size: Size,
    // Memory pressure thresholds (ratio of max_size)
    warning_threshold: f64,  // 80%
    critical_threshold: f64, // 95%
}

/// Serializable copy of both block lists, in list order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub free: Vec<MemoryBlock>,
    pub allocated: Vec<MemoryBlock>,
}

impl MemorySpace {
    /// Create a memory space of `max_size` words with default thresholds
    pub fn new(max_size: Size) -> Self {
        Self::with_config(MemoryConfig::default().with_max_size(max_size))
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        let mut free_blocks = BlockList::new();
        if config.max_size > 0 {
            free_blocks.push_back(MemoryBlock::new(0, config.max_size));
        }

        info!(
            "Memory space initialized with {} words (first-fit, coalescing on free)",
            config.max_size
        );

        Self {
            free_blocks,
            allocated_blocks: BlockList::new(),
            max_size: config.max_size,
            warning_threshold: config.warning_threshold,
            critical_threshold: config.critical_threshold,
        }
    }

    /// Rebuild a memory space from a snapshot
    ///
    /// The blocks of both lists must tile `[0, max_size)` exactly, where
    /// `max_size` is the end of the highest block. List order is preserved.
    pub fn restore(snapshot: MemorySnapshot) -> MemoryResult<Self> {
        let max_size = validate_layout(&snapshot.free, &snapshot.allocated)?;
        let config = MemoryConfig::default().with_max_size(max_size);

        info!(
            "Memory space restored: {} words, {} free blocks, {} allocated blocks",
            max_size,
            snapshot.free.len(),
            snapshot.allocated.len()
        );

        Ok(Self {
            free_blocks: snapshot.free.into_iter().collect(),
            allocated_blocks: snapshot.allocated.into_iter().collect(),
            max_size,
            warning_threshold: config.warning_threshold,
            critical_threshold: config.critical_threshold,
        })
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            free: self.free_blocks.values().copied().collect(),
            allocated: self.allocated_blocks.values().copied().collect(),
        }
    }

    /// Free blocks, in list order
    pub fn free_blocks(&self) -> &BlockList<MemoryBlock> {
        &self.free_blocks
    }

    /// Allocated blocks, in allocation order
    pub fn allocated_blocks(&self) -> &BlockList<MemoryBlock> {
        &self.allocated_blocks
    }

    pub fn max_size(&self) -> Size {
        self.max_size
    }

    pub fn config(&self) -> MemoryConfig {
        MemoryConfig {
            max_size: self.max_size,
            warning_threshold: self.warning_threshold,
            critical_threshold: self.critical_threshold,
        }
    }
}

/// Check that the blocks tile `[0, end)` without gaps or overlaps and return `end`
fn validate_layout(free: &[MemoryBlock], allocated: &[MemoryBlock]) -> MemoryResult<Size> {
    let mut blocks: Vec<&MemoryBlock> = free.iter().chain(allocated).collect();
    blocks.sort_by_key(|block| block.address);

    let mut expected = 0;
    let mut previous: Option<&MemoryBlock> = None;
    for block in blocks {
        if block.size == 0 {
            return Err(MemoryError::InvalidLayout(format!(
                "zero-length block at {}",
                block.address
            )));
        }
        // Every end() below is safe once this passes
        let end = block.address.checked_add(block.size).ok_or_else(|| {
            MemoryError::InvalidLayout(format!("block {} overflows the address space", block))
        })?;
        if let Some(previous) = previous.filter(|previous| previous.overlaps(block)) {
            return Err(MemoryError::InvalidLayout(format!(
                "block {} overlaps block {}",
                block, previous
            )));
        }
        if block.address > expected {
            return Err(MemoryError::InvalidLayout(format!(
                "addresses {}..{} are not covered by any block",
                expected, block.address
            )));
        }
        expected = end;
        previous = Some(block);
    }

    Ok(expected)
}

// Implement trait interfaces
impl Allocator for MemorySpace {
    fn malloc(&mut self, length: RequestSize) -> MemoryResult<Address> {
        MemorySpace::malloc(self, length)
    }

    fn free(&mut self, address: Address) -> MemoryResult<()> {
        MemorySpace::free(self, address)
    }

    fn is_valid(&self, address: Address) -> bool {
        MemorySpace::is_valid(self, address)
    }

    fn block_size(&self, address: Address) -> Option<Size> {
        MemorySpace::block_size(self, address)
    }
}

impl Defragment for MemorySpace {
    fn defrag(&mut self) -> usize {
        MemorySpace::defrag(self)
    }
}

impl MemoryInfo for MemorySpace {
    fn stats(&self) -> MemoryStats {
        MemorySpace::stats(self)
    }

    fn info(&self) -> (Size, Size, Size) {
        MemorySpace::info(self)
    }

    fn pressure(&self) -> MemoryPressure {
        self.stats()
            .pressure_with(self.warning_threshold, self.critical_threshold)
    }
}

impl Default for MemorySpace {
    fn default() -> Self {
        Self::with_config(MemoryConfig::default())
    }
}
