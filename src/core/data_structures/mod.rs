/*!
 * Data Structures
 *
 * Specialized data structures for the memory space:
 * - Block list: ordered sequence with positional and handle-based access
 *
 * # Performance
 *
 * - Arena-backed nodes: no per-node heap allocation after warm-up
 * - Generational handles: removed entries can never be reached again
 */

mod block_list;

pub use block_list::{BlockHandle, BlockList, BlockListError, Iter};
