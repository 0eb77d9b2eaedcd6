//! Cache Store Module
//!
//! Byte-budgeted LRU cache combining a key index with the recency list.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::entry::{entry_size, Entry, EntryId};
use crate::cache::{CacheStats, RecencyList};

// == Simple LRU ==
/// Bounded LRU cache whose budget is the total byte size of keys and values.
///
/// The index only holds handles into the recency list; the list owns every
/// entry. Both structures and `current_size` are updated together inside each
/// public call, so callers never observe them out of sync.
///
/// Not thread-safe on its own: share it behind a single lock.
#[derive(Debug)]
pub struct SimpleLru {
    /// Key -> entry handle
    index: HashMap<Arc<[u8]>, EntryId>,
    /// Entries from least to most recently used
    list: RecencyList,
    /// Sum of key and value lengths over all entries
    current_size: usize,
    /// Maximum total size in bytes
    capacity: usize,
    /// Performance statistics
    stats: CacheStats,
}

impl SimpleLru {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::new(),
            list: RecencyList::new(),
            current_size: 0,
            capacity,
            stats: CacheStats::new(capacity),
        }
    }

    // == Put ==
    /// Inserts `key` or overwrites its value.
    ///
    /// Either way the entry ends up most recently used. Returns false without
    /// touching the cache if the pair alone exceeds the capacity.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> bool {
        if !self.fits(key, value) {
            debug!(
                size = entry_size(key, value),
                capacity = self.capacity,
                "put rejected: entry too large"
            );
            return false;
        }

        match self.access(key) {
            Some(id) => self.replace_value(id, value),
            None => self.insert(key, value),
        }
        true
    }

    // == Put If Absent ==
    /// Inserts `key` only if it is not already present.
    pub fn put_if_absent(&mut self, key: &[u8], value: &[u8]) -> bool {
        if !self.fits(key, value) {
            debug!(
                size = entry_size(key, value),
                capacity = self.capacity,
                "put_if_absent rejected: entry too large"
            );
            return false;
        }
        if self.index.contains_key(key) {
            return false;
        }

        self.insert(key, value);
        true
    }

    // == Set ==
    /// Replaces the value of an existing key. Never creates a key.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> bool {
        if !self.fits(key, value) {
            debug!(
                size = entry_size(key, value),
                capacity = self.capacity,
                "set rejected: entry too large"
            );
            return false;
        }

        match self.access(key) {
            Some(id) => {
                self.replace_value(id, value);
                true
            }
            None => false,
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &[u8]) -> Option<&[u8]> {
        match self.access(key) {
            Some(id) => {
                self.stats.record_hit();
                self.list.get(id).map(Entry::value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Returns the value for `key` without updating recency or statistics.
    pub fn peek(&self, key: &[u8]) -> Option<&[u8]> {
        let id = self.index.get(key)?;
        self.list.get(*id).map(Entry::value)
    }

    // == Delete ==
    /// Removes `key`. Returns false if it was not present.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        match self.index.get(key).copied() {
            Some(id) => self.detach(id).is_some(),
            None => false,
        }
    }

    // == Accessors ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently held by keys and values.
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.index.contains_key(key)
    }

    /// Whether a key/value pair could ever be held by this cache.
    pub fn fits(&self, key: &[u8], value: &[u8]) -> bool {
        entry_size(key, value) <= self.capacity
    }

    /// Keys ordered from least to most recently used.
    pub fn keys_lru_order(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.list.iter().map(Entry::key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.list.len(), self.current_size);
        stats
    }

    /// Locates `key` and marks it most recently used.
    fn access(&mut self, key: &[u8]) -> Option<EntryId> {
        let id = *self.index.get(key)?;
        self.touch(id);
        Some(id)
    }

    fn touch(&mut self, id: EntryId) {
        self.list.move_to_back(id);
    }

    /// Links a new entry at the most recently used end. `key` must be absent.
    fn append(&mut self, key: &[u8], value: &[u8]) -> EntryId {
        let key: Arc<[u8]> = Arc::from(key);
        let entry = Entry::new(Arc::clone(&key), value.to_vec());

        self.current_size += entry.size();
        let id = self.list.push_back(entry);
        self.index.insert(key, id);
        id
    }

    /// Unlinks an entry from both structures and releases its bytes.
    fn detach(&mut self, id: EntryId) -> Option<Entry> {
        let entry = self.list.remove(id)?;
        self.index.remove(entry.key());
        self.current_size -= entry.size();
        Some(entry)
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) {
        self.make_room(0, entry_size(key, value), None);
        self.append(key, value);
    }

    /// Overwrites the value of a live entry, adjusting the size by the
    /// signed difference between the old and new value.
    fn replace_value(&mut self, id: EntryId, value: &[u8]) {
        let released = match self.list.get(id) {
            Some(entry) => entry.value().len(),
            None => return,
        };

        self.make_room(released, value.len(), Some(id));

        if let Some(entry) = self.list.get_mut(id) {
            let old = entry.replace_value(value.to_vec());
            self.current_size = self.current_size - old.len() + value.len();
        }
    }

    // == Eviction ==
    /// Evicts least recently used entries until `incoming` bytes fit once
    /// `released` bytes are given back. `keep` is never evicted.
    fn make_room(&mut self, released: usize, incoming: usize, keep: Option<EntryId>) {
        while self.current_size - released + incoming > self.capacity {
            let oldest = match self.list.front() {
                Some(id) if Some(id) != keep => id,
                _ => break,
            };

            match self.detach(oldest) {
                Some(evicted) => {
                    self.stats.record_eviction();
                    debug!(
                        size = evicted.size(),
                        current_size = self.current_size,
                        "evicted least recently used entry"
                    );
                }
                None => break,
            }
        }
    }

    /// Walks both structures and panics on any broken invariant.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut size = 0;
        let mut count = 0;
        let mut prev: Option<EntryId> = None;
        let mut cursor = self.list.front();

        while let Some(id) = cursor {
            let entry = self.list.get(id).expect("linked handle must be live");
            assert_eq!(entry.prev, prev, "broken back link");
            assert_eq!(self.index.get(entry.key()), Some(&id), "index out of sync");

            size += entry.size();
            count += 1;
            assert!(count <= self.list.len(), "cycle in recency list");

            prev = Some(id);
            cursor = entry.next;
        }

        assert_eq!(self.list.back(), prev, "tail is not the last entry");
        assert_eq!(count, self.list.len(), "list length mismatch");
        assert_eq!(self.index.len(), count, "index holds extra keys");
        assert_eq!(self.current_size, size, "size accounting drift");
        assert!(self.current_size <= self.capacity, "over capacity");
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(cache: &SimpleLru) -> Vec<Vec<u8>> {
        cache.keys_lru_order().map(<[u8]>::to_vec).collect()
    }

    #[test]
    fn test_store_new() {
        let cache = SimpleLru::new(100);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 100);
        assert_eq!(cache.current_size(), 0);
        cache.assert_invariants();
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = SimpleLru::new(100);

        assert!(cache.put(b"key1", b"value1"));

        assert_eq!(cache.get(b"key1"), Some(&b"value1"[..]));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 10);
        cache.assert_invariants();
    }

    #[test]
    fn test_get_nonexistent() {
        let mut cache = SimpleLru::new(100);
        assert!(cache.get(b"nonexistent").is_none());
    }

    #[test]
    fn test_put_overwrite_adjusts_size() {
        let mut cache = SimpleLru::new(100);

        cache.put(b"key1", b"value1");
        assert!(cache.put(b"key1", b"v2"));

        assert_eq!(cache.get(b"key1"), Some(&b"v2"[..]));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 6);
        cache.assert_invariants();
    }

    #[test]
    fn test_put_overwrite_promotes_entry() {
        let mut cache = SimpleLru::new(100);

        cache.put(b"a", b"1");
        cache.put(b"b", b"2");
        cache.put(b"a", b"3");

        assert_eq!(keys(&cache), vec![b"b".to_vec(), b"a".to_vec()]);
    }

    #[test]
    fn test_put_oversized_rejected() {
        let mut cache = SimpleLru::new(10);
        cache.put(b"a", b"b");

        assert!(!cache.put(b"key", b"12345678"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 2);
        assert!(!cache.contains(b"key"));
    }

    #[test]
    fn test_put_exactly_capacity() {
        let mut cache = SimpleLru::new(10);
        cache.put(b"a", b"b");

        assert!(cache.put(b"key", b"1234567"));

        assert_eq!(keys(&cache), vec![b"key".to_vec()]);
        assert_eq!(cache.current_size(), 10);
        cache.assert_invariants();
    }

    #[test]
    fn test_eviction_under_pressure() {
        let mut cache = SimpleLru::new(10);

        assert!(cache.put(b"aa", b"bb"));
        assert!(cache.put(b"cc", b"dddd"));
        assert_eq!(cache.current_size(), 10);

        assert!(cache.put(b"e", b"f"));

        assert_eq!(cache.current_size(), 8);
        assert!(cache.get(b"aa").is_none());
        assert_eq!(cache.get(b"cc"), Some(&b"dddd"[..]));
        assert_eq!(cache.get(b"e"), Some(&b"f"[..]));
        assert_eq!(cache.stats().evictions, 1);
        cache.assert_invariants();
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let mut cache = SimpleLru::new(12);

        cache.put(b"k1", b"v1");
        cache.put(b"k2", b"v2");
        cache.put(b"k3", b"v3");

        // k1 becomes most recently used, so k2 is evicted next
        cache.get(b"k1");
        cache.put(b"k4", b"v4");

        assert!(cache.contains(b"k1"));
        assert!(!cache.contains(b"k2"));
        assert!(cache.contains(b"k3"));
        assert!(cache.contains(b"k4"));
    }

    #[test]
    fn test_growing_update_evicts_others_not_self() {
        let mut cache = SimpleLru::new(10);

        cache.put(b"a", b"1");
        cache.put(b"b", b"2");
        cache.put(b"c", b"3");

        assert!(cache.put(b"a", b"123456789"));

        assert_eq!(keys(&cache), vec![b"a".to_vec()]);
        assert_eq!(cache.current_size(), 10);
        assert_eq!(cache.stats().evictions, 2);
        cache.assert_invariants();
    }

    #[test]
    fn test_shrinking_update_evicts_nothing() {
        let mut cache = SimpleLru::new(10);

        cache.put(b"a", b"1234");
        cache.put(b"b", b"1234");

        assert!(cache.set(b"a", b"1"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 7);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_put_if_absent_inserts() {
        let mut cache = SimpleLru::new(100);

        assert!(cache.put_if_absent(b"k", b"v1"));
        assert_eq!(cache.get(b"k"), Some(&b"v1"[..]));
    }

    #[test]
    fn test_put_if_absent_keeps_existing_value() {
        let mut cache = SimpleLru::new(100);

        cache.put(b"k", b"v1");
        cache.put(b"other", b"x");

        assert!(!cache.put_if_absent(b"k", b"v2"));

        assert_eq!(cache.peek(b"k"), Some(&b"v1"[..]));
        // recency untouched by the rejected call
        assert_eq!(keys(&cache), vec![b"k".to_vec(), b"other".to_vec()]);
    }

    #[test]
    fn test_put_if_absent_evicts() {
        let mut cache = SimpleLru::new(10);

        cache.put(b"aa", b"bb");
        cache.put(b"cc", b"dddd");

        assert!(cache.put_if_absent(b"e", b"f"));

        assert!(!cache.contains(b"aa"));
        assert_eq!(cache.current_size(), 8);
        cache.assert_invariants();
    }

    #[test]
    fn test_put_if_absent_oversized_rejected() {
        let mut cache = SimpleLru::new(4);
        assert!(!cache.put_if_absent(b"abc", b"de"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_existing() {
        let mut cache = SimpleLru::new(100);

        cache.put(b"a", b"1");
        cache.put(b"b", b"2");

        assert!(cache.set(b"a", b"updated"));

        assert_eq!(cache.peek(b"a"), Some(&b"updated"[..]));
        assert_eq!(keys(&cache), vec![b"b".to_vec(), b"a".to_vec()]);
        assert_eq!(cache.current_size(), 10);
    }

    #[test]
    fn test_set_never_creates() {
        let mut cache = SimpleLru::new(100);

        assert!(!cache.set(b"missing", b"v"));

        assert!(cache.is_empty());
        assert!(cache.get(b"missing").is_none());
    }

    #[test]
    fn test_set_oversized_rejected() {
        let mut cache = SimpleLru::new(6);
        cache.put(b"k", b"v");

        assert!(!cache.set(b"k", b"123456"));

        assert_eq!(cache.peek(b"k"), Some(&b"v"[..]));
        assert_eq!(cache.current_size(), 2);
    }

    #[test]
    fn test_delete() {
        let mut cache = SimpleLru::new(100);

        cache.put(b"key1", b"value1");

        assert!(cache.delete(b"key1"));
        assert!(cache.is_empty());
        assert_eq!(cache.current_size(), 0);
        assert!(cache.get(b"key1").is_none());
        cache.assert_invariants();
    }

    #[test]
    fn test_delete_nonexistent() {
        let mut cache = SimpleLru::new(100);
        cache.put(b"a", b"1");

        assert!(!cache.delete(b"nonexistent"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_size(), 2);
    }

    #[test]
    fn test_delete_then_reinsert() {
        let mut cache = SimpleLru::new(100);

        cache.put(b"a", b"1");
        cache.put(b"b", b"2");
        cache.delete(b"a");

        assert!(cache.put(b"a", b"3"));

        assert_eq!(keys(&cache), vec![b"b".to_vec(), b"a".to_vec()]);
        assert_eq!(cache.peek(b"a"), Some(&b"3"[..]));
        cache.assert_invariants();
    }

    #[test]
    fn test_empty_key_and_value() {
        let mut cache = SimpleLru::new(1);

        assert!(cache.put(b"", b""));
        assert_eq!(cache.get(b""), Some(&b""[..]));
        assert_eq!(cache.current_size(), 0);
    }

    #[test]
    fn test_binary_keys_and_values() {
        let mut cache = SimpleLru::new(100);

        assert!(cache.put(&[0, 159, 146, 150], &[255, 0, 1]));
        assert_eq!(cache.get(&[0, 159, 146, 150]), Some(&[255u8, 0, 1][..]));
        assert_eq!(cache.current_size(), 7);
    }

    #[test]
    fn test_stats() {
        let mut cache = SimpleLru::new(100);

        cache.put(b"key1", b"value1");
        cache.get(b"key1"); // hit
        cache.get(b"nonexistent"); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.current_size, 10);
        assert_eq!(stats.capacity, 100);
    }
}
