//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU ordering and TTL expiration.
//!
//! The store itself is a plain single-owner struct. Concurrent callers share it as
//! a [`SharedStore`] and hold the mutex for exactly one operation at a time; none of
//! these methods lock, call back out, or await.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheKey, CacheStats, LruTracker};

/// A store shared between request handlers and the sweeper.
pub type SharedStore = Arc<Mutex<CacheStore>>;

#[derive(Debug)]
struct Slot {
    entry: CacheEntry,
    /// Position of this key in the recency arena
    index: usize,
}

// == Cache Store ==
/// Bounded audio cache with LRU eviction and strict TTL.
///
/// Lookups validate age themselves, so an expired entry is never served even if
/// the sweeper has not run yet.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<CacheKey, Slot>,
    /// Recency order; its key set always equals `entries`' key set
    order: LruTracker<CacheKey>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Maximum age an entry may be served at
    ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries; 0 disables caching entirely
    /// * `ttl` - Maximum age of a servable entry
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: LruTracker::new(),
            stats: CacheStats::new(),
            capacity,
            ttl,
        }
    }

    /// Wraps the store for sharing across tasks.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    // == Get ==
    /// Retrieves a payload by key.
    ///
    /// A hit moves the key to the most-recently-used end. An entry older than the
    /// TTL is removed on the spot and reported as a miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<Bytes> {
        let (index, expired) = match self.entries.get(key) {
            Some(slot) => (slot.index, slot.entry.is_expired(self.ttl)),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.order.touch(index);
        self.stats.record_hit();
        self.entries.get(key).map(|slot| slot.entry.payload.clone())
    }

    // == Set ==
    /// Stores a payload under `key`, stamped with the current time.
    ///
    /// If the key already exists its payload and timestamp are replaced and it
    /// becomes most recently used. Otherwise, when the store is full, the least
    /// recently used entry is evicted first.
    pub fn set(&mut self, key: CacheKey, payload: Bytes) {
        if self.capacity == 0 {
            return;
        }

        // Overwrite case
        if let Some(slot) = self.entries.get_mut(&key) {
            slot.entry = CacheEntry::new(payload);
            let index = slot.index;
            self.order.touch(index);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.order.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "Evicted least recently used entry");
            }
        }

        let index = self.order.push_front(key);
        self.entries.insert(
            key,
            Slot {
                entry: CacheEntry::new(payload),
                index,
            },
        );
        self.stats.set_total_entries(self.entries.len());
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn remove(&mut self, key: &CacheKey) -> bool {
        match self.entries.remove(key) {
            Some(slot) => {
                self.order.remove(slot.index);
                self.stats.set_total_entries(self.entries.len());
                true
            }
            None => false,
        }
    }

    // == Purge Expired ==
    /// Removes every entry older than the TTL.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, slot)| slot.entry.is_expired(ttl))
            .map(|(key, _)| *key)
            .collect();

        for key in &expired {
            self.remove(key);
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

    // == Peek ==
    /// Returns a live payload without bumping recency or counting a hit/miss.
    ///
    /// Expired entries read as absent but are left for `get` or the sweeper.
    pub fn peek(&self, key: &CacheKey) -> Option<Bytes> {
        self.entries
            .get(key)
            .filter(|slot| !slot.entry.is_expired(self.ttl))
            .map(|slot| slot.entry.payload.clone())
    }

    /// Checks residency without touching recency, expiry or stats.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<CacheKey> {
        self.order.iter().copied().collect()
    }
}
