//! Cache Module
//!
//! Provides a byte-budgeted in-memory cache with LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub(crate) use entry::{entry_size, Entry, EntryId};
pub(crate) use lru::RecencyList;
pub use stats::CacheStats;
pub use store::SimpleLru;

// == Public Constants ==
/// Default cache capacity in bytes
pub const DEFAULT_CAPACITY: usize = 1024 * 1024; // 1 MB
