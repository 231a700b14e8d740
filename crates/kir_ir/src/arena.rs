//! Dense, slot-indexed storage for tree nodes.
//!
//! The [`Arena`] provides O(1) insertion and lookup by opaque [`ArenaId`] keys.
//! Unlike a borrow-checked pointer graph, slots may be referenced from anywhere
//! (including dangling or cyclic references decoded from untrusted bytes), so
//! lookups are checked and return `Option`.

use std::marker::PhantomData;

/// Trait for opaque ID types used as arena keys.
///
/// Implementors must provide a bijection between `u32` indices and the ID type.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

/// A dense, ID-indexed container.
///
/// Items are always appended (never reordered or removed), making IDs stable
/// for the lifetime of the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocates a new item in the arena and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Returns the item with the given ID, or `None` if it is out of bounds.
    pub fn get(&self, id: I) -> Option<&T> {
        self.items.get(id.as_raw() as usize)
    }

    /// Returns the item with the given ID mutably, or `None` if it is out of bounds.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.items.get_mut(id.as_raw() as usize)
    }

    /// Returns `true` if the ID refers to an allocated slot.
    pub fn contains(&self, id: I) -> bool {
        (id.as_raw() as usize) < self.items.len()
    }

    /// Returns the number of items in the arena.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the arena contains no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(ID, &T)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates over references to items in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}
