//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with age tracking.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Cache Entry ==
/// A synthesized payload plus the moment it was written.
///
/// The TTL lives on the store, not the entry: every entry in a store ages
/// against the same limit.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored audio bytes
    pub payload: Bytes,
    /// Creation time (monotonic)
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(payload: Bytes) -> Self {
        Self {
            payload,
            created_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed since the entry was written.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry is expired only once its age is strictly
    /// greater than the TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}
