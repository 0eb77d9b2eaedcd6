//! Cache Entry Module
//!
//! Defines a single key/value pair together with its links in recency order.

use std::sync::Arc;

// == Entry Id ==
/// Stable handle to an entry slot inside the recency list arena.
///
/// Handles stay valid until the entry is detached; the slot may then be
/// reused by a later insertion, and a stale handle would then address the
/// new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

// == Entry ==
/// Represents one cached key/value pair.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The key, shared with the key index
    pub(crate) key: Arc<[u8]>,
    /// The stored value
    pub(crate) value: Vec<u8>,
    /// Neighbour towards the least recently used end
    pub(crate) prev: Option<EntryId>,
    /// Neighbour towards the most recently used end
    pub(crate) next: Option<EntryId>,
}

impl Entry {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: Arc<[u8]>, value: Vec<u8>) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    /// Returns the entry key.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Returns the stored value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    // == Size ==
    /// Number of bytes this entry counts against the cache capacity.
    pub fn size(&self) -> usize {
        entry_size(&self.key, &self.value)
    }

    // == Replace Value ==
    /// Swaps in a new value and returns the old one.
    pub fn replace_value(&mut self, value: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.value, value)
    }
}

// == Utility Functions ==
/// Combined byte size of a key/value pair.
pub fn entry_size(key: &[u8], value: &[u8]) -> usize {
    key.len() + value.len()
}
