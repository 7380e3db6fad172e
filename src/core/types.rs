/*!
 * Core Types
 * Common types used across the memory space
 */

/// Address type for memory operations
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Requested allocation length as supplied by a caller
///
/// Signed so that zero and negative requests reach the allocator and are
/// rejected there instead of wrapping around.
pub type RequestSize = isize;

/// Address as typed by a shell user; negative values are reported, not parsed away
pub type RequestAddress = isize;
