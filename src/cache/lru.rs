//! Recency List Module
//!
//! Doubly-linked list of entries ordered by access time, stored in an arena
//! and addressed by [`EntryId`] handles instead of pointers.

use crate::cache::entry::{Entry, EntryId};

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// Entries are linked from:
/// - Front (head) = Least recently used
/// - Back (tail) = Most recently used
///
/// Detached slots are kept on a free list and reused by later insertions,
/// so an [`EntryId`] is only valid until its entry is removed. Callers must
/// drop every copy of a handle when they remove it.
#[derive(Debug, Default)]
pub struct RecencyList {
    /// Arena of entry slots; `None` marks a vacant slot
    slots: Vec<Option<Entry>>,
    /// Indices of vacant slots
    free: Vec<usize>,
    /// Least recently used entry
    head: Option<EntryId>,
    /// Most recently used entry
    tail: Option<EntryId>,
    /// Number of linked entries
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Accessors ==
    /// Returns the entry behind `id`, or None if the handle is not live.
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable access to the entry behind `id`.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Handle of the least recently used entry.
    pub fn front(&self) -> Option<EntryId> {
        self.head
    }

    /// Handle of the most recently used entry.
    #[allow(dead_code)]
    pub fn back(&self) -> Option<EntryId> {
        self.tail
    }

    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Push Back ==
    /// Stores `entry` in a free slot and links it as the most recently used.
    pub fn push_back(&mut self, entry: Entry) -> EntryId {
        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                EntryId(slot)
            }
            None => {
                self.slots.push(Some(entry));
                EntryId(self.slots.len() - 1)
            }
        };

        self.link_back(id);
        self.len += 1;
        id
    }

    // == Remove ==
    /// Unlinks the entry and releases its slot.
    ///
    /// Returns None if `id` is not live.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        self.get(id)?;
        self.unlink(id);

        let entry = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(entry)
    }

    // == Move To Back ==
    /// Marks the entry as most recently used.
    ///
    /// No-op if it already is, or if `id` is not live.
    pub fn move_to_back(&mut self, id: EntryId) {
        if self.tail == Some(id) || self.get(id).is_none() {
            return;
        }

        self.unlink(id);
        self.link_back(id);
    }

    // == Iter ==
    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            next: self.head,
        }
    }

    /// Reconnects the neighbours of `id` around it and clears its links.
    fn unlink(&mut self, id: EntryId) {
        let (prev, next) = match self.get(id) {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };

        match prev.and_then(|p| self.get_mut(p)) {
            Some(prev_entry) => prev_entry.next = next,
            None => self.head = next,
        }

        match next.and_then(|n| self.get_mut(n)) {
            Some(next_entry) => next_entry.prev = prev,
            None => self.tail = prev,
        }

        if let Some(entry) = self.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
    }

    /// Links an unlinked `id` after the current tail.
    fn link_back(&mut self, id: EntryId) {
        let old_tail = self.tail;

        if let Some(entry) = self.get_mut(id) {
            entry.prev = old_tail;
            entry.next = None;
        }

        match old_tail.and_then(|t| self.get_mut(t)) {
            Some(tail_entry) => tail_entry.next = Some(id),
            None => self.head = Some(id),
        }

        self.tail = Some(id);
    }
}

// == Iterator ==
/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a> {
    list: &'a RecencyList,
    next: Option<EntryId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.list.get(self.next?)?;
        self.next = entry.next;
        Some(entry)
    }
}
