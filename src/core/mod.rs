/*!
 * Core Module
 * Fundamental types, limits and data structures
 */

pub mod data_structures;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use data_structures::{BlockHandle, BlockList, BlockListError};
pub use types::*;
