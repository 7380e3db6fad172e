/*!
 * Memory Space Library
 * Simulated first-fit memory manager exposed as a library
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod shell;

// Re-exports
pub use crate::core::{
    Address, BlockHandle, BlockList, BlockListError, RequestAddress, RequestSize, Size,
};
pub use memory::{
    Allocator, Defragment, MemoryBlock, MemoryConfig, MemoryError, MemoryInfo, MemoryPressure,
    MemoryResult, MemorySnapshot, MemorySpace, MemoryStats,
};
pub use monitoring::init_tracing;
pub use shell::{Command, Outcome, ScriptSummary, Shell, ShellError};
