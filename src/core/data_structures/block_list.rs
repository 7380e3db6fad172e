/*!
 * Block List
 * Ordered sequence of block descriptors with stable node handles
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Source of list identities; a handle remembers which list issued it
static NEXT_LIST_ID: AtomicU32 = AtomicU32::new(1);

/// Block list errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockListError {
    #[error("Index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("List is empty")]
    Empty,

    #[error("Block not found in the list")]
    NotFound,

    #[error("Handle was issued by a different list")]
    ForeignHandle,

    #[error("Handle refers to an entry that was already removed")]
    StaleHandle,
}

/// Opaque position of an entry inside a [`BlockList`]
///
/// Handles stay valid while their entry is in the list, regardless of
/// insertions or removals elsewhere. Once the entry is removed its slot may
/// be reused, but the generation bump makes the old handle stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle {
    list: u32,
    slot: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    next: Option<u32>,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// Singly linked, tail-tracked list stored in an arena of slots
///
/// # Performance
/// - `push_back`, `push_front`, `front`, `back`, `len`: O(1)
/// - Indexed access and handle removal walk from the head: O(n)
/// - Vacated slots are recycled, so the arena never outgrows the peak length
pub struct BlockList<T> {
    id: u32,
    slots: Vec<Slot<T>>,
    vacant: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl<T> BlockList<T> {
    pub fn new() -> Self {
        Self {
            id: NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            vacant: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First entry in list order
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|slot| self.node(slot)).map(|n| &n.value)
    }

    /// Last entry in list order
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|slot| self.node(slot)).map(|n| &n.value)
    }

    /// Insert `value` so that it ends up at position `index`
    ///
    /// `index == len()` appends. Anything larger is rejected without touching
    /// the list.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<BlockHandle, BlockListError> {
        if index > self.len {
            return Err(BlockListError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }

        let prev = if index == 0 {
            None
        } else if index == self.len {
            self.tail
        } else {
            self.slot_at(index - 1)
        };

        let slot = self.link_after(prev, value);
        Ok(self.handle(slot))
    }

    pub fn push_back(&mut self, value: T) -> BlockHandle {
        let slot = self.link_after(self.tail, value);
        self.handle(slot)
    }

    pub fn push_front(&mut self, value: T) -> BlockHandle {
        let slot = self.link_after(None, value);
        self.handle(slot)
    }

    /// Remove the entry a handle points at and return its value
    pub fn remove(&mut self, handle: BlockHandle) -> Result<T, BlockListError> {
        if self.is_empty() {
            return Err(BlockListError::Empty);
        }
        let slot = self.resolve(handle)?;
        let prev = self.predecessor(slot);
        self.unlink(prev, slot).ok_or(BlockListError::StaleHandle)
    }

    /// Entry at a 0-based position in list order
    pub fn at(&self, index: usize) -> Result<&T, BlockListError> {
        self.slot_at(index)
            .and_then(|slot| self.node(slot))
            .map(|n| &n.value)
            .ok_or(BlockListError::IndexOutOfBounds {
                index,
                len: self.len,
            })
    }

    pub fn get(&self, handle: BlockHandle) -> Option<&T> {
        let slot = self.resolve(handle).ok()?;
        self.node(slot).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, handle: BlockHandle) -> Option<&mut T> {
        let slot = self.resolve(handle).ok()?;
        self.node_mut(slot).map(|n| &mut n.value)
    }

    /// Iterate `(handle, value)` pairs front to back
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Iterate values front to back
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, value)| value)
    }

    // ------------------------------------------------------------------------
    // Slot bookkeeping
    // ------------------------------------------------------------------------

    fn handle(&self, slot: u32) -> BlockHandle {
        BlockHandle {
            list: self.id,
            slot,
            generation: self.slots[slot as usize].generation,
        }
    }

    fn resolve(&self, handle: BlockHandle) -> Result<u32, BlockListError> {
        if handle.list != self.id {
            return Err(BlockListError::ForeignHandle);
        }
        match self.slots.get(handle.slot as usize) {
            Some(slot) if slot.generation == handle.generation && slot.node.is_some() => {
                Ok(handle.slot)
            }
            _ => Err(BlockListError::StaleHandle),
        }
    }

    fn node(&self, slot: u32) -> Option<&Node<T>> {
        self.slots.get(slot as usize).and_then(|s| s.node.as_ref())
    }

    fn node_mut(&mut self, slot: u32) -> Option<&mut Node<T>> {
        self.slots.get_mut(slot as usize).and_then(|s| s.node.as_mut())
    }

    fn slot_at(&self, index: usize) -> Option<u32> {
        if index >= self.len {
            return None;
        }
        let mut cursor = self.head;
        for _ in 0..index {
            cursor = cursor.and_then(|slot| self.node(slot)).and_then(|n| n.next);
        }
        cursor
    }

    /// Slot linking to `slot`, or `None` when `slot` is the head
    fn predecessor(&self, slot: u32) -> Option<u32> {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(current) = cursor {
            if current == slot {
                break;
            }
            prev = Some(current);
            cursor = self.node(current).and_then(|n| n.next);
        }
        prev
    }

    fn allocate_slot(&mut self, node: Node<T>) -> u32 {
        match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot as usize].node = Some(node);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                (self.slots.len() - 1) as u32
            }
        }
    }

    /// Link a new node after `prev` (at the head when `prev` is `None`)
    fn link_after(&mut self, prev: Option<u32>, value: T) -> u32 {
        let next = match prev {
            Some(p) => self.node(p).and_then(|n| n.next),
            None => self.head,
        };
        let slot = self.allocate_slot(Node { value, next });

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        if next.is_none() {
            self.tail = Some(slot);
        }

        self.len += 1;
        slot
    }

    fn unlink(&mut self, prev: Option<u32>, slot: u32) -> Option<T> {
        let entry = self.slots.get_mut(slot as usize)?;
        let node = entry.node.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.vacant.push(slot);

        match prev {
            Some(p) => {
                if let Some(prev_node) = self.node_mut(p) {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        if node.next.is_none() {
            self.tail = prev;
        }

        self.len -= 1;
        Some(node.value)
    }
}

impl<T: PartialEq> BlockList<T> {
    /// Remove the first entry equal to `value`, scanning from the front
    pub fn remove_value(&mut self, value: &T) -> Result<T, BlockListError> {
        if self.is_empty() {
            return Err(BlockListError::Empty);
        }

        let mut prev = None;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let node = match self.node(slot) {
                Some(node) => node,
                None => break,
            };
            if node.value == *value {
                return self.unlink(prev, slot).ok_or(BlockListError::NotFound);
            }
            prev = Some(slot);
            cursor = node.next;
        }

        Err(BlockListError::NotFound)
    }

    /// Position of the first entry equal to `value`
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.values().position(|v| v == value)
    }
}

impl<T> Default for BlockList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning produces an independent list; handles of the source do not
/// resolve against the copy.
impl<T: Clone> Clone for BlockList<T> {
    fn clone(&self) -> Self {
        self.values().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for BlockList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values()).finish()
    }
}

impl<T: PartialEq> PartialEq for BlockList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.values().eq(other.values())
    }
}

impl<T> FromIterator<T> for BlockList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for BlockList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a BlockList<T> {
    type Item = (BlockHandle, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-back traversal of a [`BlockList`]
pub struct Iter<'a, T> {
    list: &'a BlockList<T>,
    cursor: Option<u32>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (BlockHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.list.node(slot)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((self.list.handle(slot), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: fmt::Display> fmt::Display for BlockList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
