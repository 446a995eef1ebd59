//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with FIFO tracking and lazy
//! TTL expiration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, FifoTracker, DEFAULT_MAX_ENTRIES};

/// A store shared between request handlers.
///
/// `CacheStore` has no interior locking; every access from concurrent tasks
/// must go through this lock. `get` mutates (lazy expiry, stats), so reads
/// take the write half too.
pub type SharedCache<V> = Arc<RwLock<CacheStore<V>>>;

// == Cache Store ==
/// Bounded key-value storage with FIFO eviction and lazy TTL expiry.
///
/// Not synchronized. Wrap it in [`SharedCache`] before handing it to more
/// than one task.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// First-insertion order
    fifo: FifoTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied when `set` is not given one
    default_ttl: Option<Duration>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries; zero is treated as one
    /// * `default_ttl` - Fallback TTL for `set` calls without their own
    pub fn new(max_entries: usize, default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            fifo: FifoTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl,
        }
    }

    /// Moves the store behind a lock for sharing across tasks.
    pub fn into_shared(self) -> SharedCache<V> {
        Arc::new(RwLock::new(self))
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// Overwriting an existing key replaces value and expiry but keeps the
    /// key's original FIFO position. A new key arriving at a full store
    /// evicts the oldest inserted entry first.
    ///
    /// A zero `ttl` counts as absent and falls back to the default TTL; a zero
    /// default means no expiry.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();

        if !self.entries.contains_key(&key) {
            if self.entries.len() >= self.max_entries {
                if let Some(evicted) = self.fifo.evict_oldest() {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                    debug!(key = %evicted, "cache eviction");
                }
            }
            self.fifo.push(&key);
        }

        let effective_ttl = ttl
            .filter(|t| !t.is_zero())
            .or(self.default_ttl.filter(|t| !t.is_zero()));

        self.entries.insert(key, CacheEntry::new(value, effective_ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` when the key is absent or expired. Expired entries are
    /// removed here, on first read after their deadline.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(),
        };

        if expired {
            self.entries.remove(key);
            self.fifo.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            debug!(key, "cache entry expired");
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Get Or ==
    /// Retrieves a value by key, falling back to `default` on a miss.
    pub fn get_or(&mut self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Recounts the most recent hit as a miss.
    ///
    /// For callers that found a value under the key but could not use it.
    pub fn reject_hit(&mut self) {
        self.stats.record_rejected_hit();
    }

    // == Clear ==
    /// Removes every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.fifo.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity after clamping.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, None)
    }
}
