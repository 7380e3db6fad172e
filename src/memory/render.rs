/*!
 * Memory Rendering
 * Textual views of blocks and block lists for diagnostics
 */

use super::space::MemorySpace;
use super::types::MemoryBlock;
use std::fmt;

impl fmt::Display for MemoryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} , {})", self.address, self.size)
    }
}

impl fmt::Display for MemorySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Free List:\n{}\nAllocated List:\n{}",
            self.free_blocks(),
            self.allocated_blocks()
        )
    }
}
