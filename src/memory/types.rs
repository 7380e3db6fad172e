/*!
 * Memory Types
 * Common types for memory management
 */

use crate::core::data_structures::BlockListError;
use crate::core::limits::{
    DEFAULT_CRITICAL_THRESHOLD, DEFAULT_MEMORY_SPACE, DEFAULT_WARNING_THRESHOLD,
    ENV_CRITICAL_THRESHOLD, ENV_MAX_SIZE, ENV_WARNING_THRESHOLD, MEDIUM_PRESSURE_THRESHOLD,
};
use crate::core::types::{Address, RequestAddress, RequestSize, Size};
use log::warn;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MemoryError {
    #[error("Invalid allocation request: length must be positive, got {length}")]
    #[diagnostic(
        code(memory::invalid_request),
        help("Request at least one word of memory.")
    )]
    InvalidRequest { length: RequestSize },

    #[error("Out of memory: requested {requested} words, largest free block is {largest_free} words ({available} words free in total)")]
    #[diagnostic(
        code(memory::out_of_memory),
        help("Free space may be fragmented. Release adjacent blocks so they can be coalesced.")
    )]
    OutOfMemory {
        requested: Size,
        largest_free: Size,
        available: Size,
    },

    #[error("Invalid memory address: {0}")]
    #[diagnostic(
        code(memory::invalid_address),
        help("Only base addresses returned by malloc can be freed, and each only once.")
    )]
    InvalidAddress(Address),

    #[error("Invalid memory address: {0}")]
    #[diagnostic(
        code(memory::negative_address),
        help("Addresses start at 0.")
    )]
    NegativeAddress(RequestAddress),

    #[error("Invalid block layout: {0}")]
    #[diagnostic(
        code(memory::invalid_layout),
        help("Free and allocated blocks must tile the address space from 0 without gaps or overlaps.")
    )]
    InvalidLayout(String),

    #[error("Block bookkeeping corrupted: {0}")]
    #[diagnostic(code(memory::corrupted))]
    Corrupted(#[from] BlockListError),
}

/// A contiguous range of addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub address: Address,
    pub size: Size,
}

impl MemoryBlock {
    pub fn new(address: Address, size: Size) -> Self {
        Self { address, size }
    }

    /// One past the last address covered by the block
    #[inline]
    pub fn end(&self) -> Address {
        self.address + self.size
    }

    #[inline]
    pub fn overlaps(&self, other: &MemoryBlock) -> bool {
        self.address < other.end() && other.address < self.end()
    }

    /// True when `other` starts exactly where this block ends
    #[inline]
    pub fn is_adjacent_to(&self, other: &MemoryBlock) -> bool {
        self.end() == other.address
    }
}

/// Memory statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memory: usize,
    pub used_memory: usize,
    pub available_memory: usize,
    pub usage_percentage: f64,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: usize,
}

impl MemoryStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        self.pressure_with(DEFAULT_WARNING_THRESHOLD, DEFAULT_CRITICAL_THRESHOLD)
    }

    /// Classify usage against explicit thresholds (ratios, not percentages)
    pub fn pressure_with(&self, warning: f64, critical: f64) -> MemoryPressure {
        let ratio = self.usage_percentage / 100.0;
        if ratio >= critical {
            MemoryPressure::Critical
        } else if ratio >= warning {
            MemoryPressure::High
        } else if ratio >= MEDIUM_PRESSURE_THRESHOLD {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }

    /// Free words that cannot be served by the largest free block
    pub fn fragmented_memory(&self) -> usize {
        self.available_memory - self.largest_free_block
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Memory space configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Size of the managed address space, in words
    pub max_size: Size,
    /// Usage ratio that triggers high-pressure warnings
    pub warning_threshold: f64,
    /// Usage ratio that triggers critical-pressure warnings
    pub critical_threshold: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MEMORY_SPACE,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

impl MemoryConfig {
    pub fn with_max_size(mut self, max_size: Size) -> Self {
        self.max_size = max_size;
        self
    }

    /// Defaults overridden by `MEMSPACE_*` environment variables
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    pub fn merge_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(max_size) = parse_var(&lookup, ENV_MAX_SIZE) {
            self.max_size = max_size;
        }

        let warning =
            parse_ratio(&lookup, ENV_WARNING_THRESHOLD).unwrap_or(self.warning_threshold);
        let critical =
            parse_ratio(&lookup, ENV_CRITICAL_THRESHOLD).unwrap_or(self.critical_threshold);
        if warning <= critical {
            self.warning_threshold = warning;
            self.critical_threshold = critical;
        } else {
            warn!(
                "Ignoring threshold overrides: warning {} exceeds critical {}",
                warning, critical
            );
        }
        self
    }
}

/// Usage ratio in `[0, 1]`; NaN and out-of-range values are logged and ignored
fn parse_ratio<F>(lookup: &F, key: &str) -> Option<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let ratio = parse_var::<f64, _>(lookup, key)?;
    if (0.0..=1.0).contains(&ratio) {
        Some(ratio)
    } else {
        warn!("Ignoring {}={}: expected a ratio between 0 and 1", key, ratio);
        None
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
