/*!
 * Memory Module
 * Memory management and allocation
 */

pub mod render;
pub mod space;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use space::{MemorySnapshot, MemorySpace};
pub use traits::*;
pub use types::*;
