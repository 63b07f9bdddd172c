//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.
//!
//! Expiry is lazy: a stale entry is only detected and dropped when it is read,
//! when it is the LRU victim of a `set`, or when `purge_expired` runs. Until
//! then it keeps its capacity slot.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Bounded, TTL-aware key-value storage with LRU eviction order.
///
/// The store is not synchronized; wrap it in a single lock per instance
/// (see `backend::LocalStore`).
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Lifetime of every entry
    ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and TTL.
    ///
    /// A capacity of zero yields a store that never retains anything.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity,
            ttl,
        }
    }

    // == Set ==
    /// Stores a value under `key`, refreshing its creation time and recency.
    ///
    /// When `key` is new and the store is full, the least recently used entry
    /// is evicted before inserting, so the size bound holds at every point.
    pub fn set(&mut self, key: String, value: String) {
        if self.capacity == 0 {
            return;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                trace!(key = %evicted, "evicted least recently used entry");
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the value for `key` if present and live.
    ///
    /// A hit promotes the entry to most recently used. A stale entry is
    /// removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now, self.ttl),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            trace!(key, "dropped stale entry on read");
            return None;
        }

        self.lru.touch(key);
        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Peek ==
    /// Returns the value for `key` if present and live, without touching
    /// recency or hit/miss statistics.
    ///
    /// A stale entry is reported as absent but left for the next `get`.
    pub fn peek(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.is_expired_at(Instant::now(), self.ttl) {
            return None;
        }
        Some(entry.value.clone())
    }

    // == Invalidate ==
    /// Removes the entry for `key` if present.
    ///
    /// Returns whether an entry was removed; absence is not an error.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.remove_entry(key)
    }

    // == Purge Expired ==
    /// Removes all stale entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now, ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        self.stats.record_expirations(expired.len());
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == TTL ==
    /// Returns the lifetime applied to every entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }
}
