//! Cache Module
//!
//! Provides an in-process TTL cache with FIFO eviction, plus memoizing
//! wrappers that put it in front of expensive calls.

mod entry;
mod fifo;
mod memoize;
mod stats;
mod store;
mod template;


// Re-export public types
pub use entry::CacheEntry;
pub use fifo::FifoTracker;
pub use memoize::Memoized;
pub use stats::CacheStats;
pub use store::{CacheStore, SharedCache};
pub use template::{KeyArg, KeyTemplate};

// == Public Constants ==
/// Capacity used by `CacheStore::default()`
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
