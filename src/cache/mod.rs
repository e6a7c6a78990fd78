//! Cache Module
//!
//! Provides the in-memory audio cache: SHA-256 request keys, TTL expiration
//! and LRU eviction behind a single mutex.

mod entry;
mod key;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::CacheKey;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheStore, SharedStore};
