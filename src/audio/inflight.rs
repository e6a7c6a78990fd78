//! In-flight generation table for request coalescing.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::cache::CacheKey;
use crate::error::FetchError;

/// A generation that any number of callers can await.
pub type SharedFetch = Shared<BoxFuture<'static, Result<Bytes, FetchError>>>;

// == In Flight ==
/// At most one pending generation per key.
///
/// The lock is a plain mutex and is never held across an await.
#[derive(Default)]
pub struct InFlight {
    pending: Mutex<HashMap<CacheKey, SharedFetch>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pending generation for `key`, or starts one with `start`.
    ///
    /// The bool is true when this call started the generation. `start` runs under
    /// the table lock, so it must only spawn work, never wait on it.
    pub fn join_or_start<F>(&self, key: CacheKey, start: F) -> (SharedFetch, bool)
    where
        F: FnOnce() -> BoxFuture<'static, Result<Bytes, FetchError>>,
    {
        let mut pending = self.pending.lock();
        if let Some(existing) = pending.get(&key) {
            return (existing.clone(), false);
        }

        let flight = start().shared();
        pending.insert(key, flight.clone());
        (flight, true)
    }

    /// Forgets the pending generation for `key`.
    pub fn finish(&self, key: &CacheKey) {
        self.pending.lock().remove(key);
    }

    /// Number of keys currently being generated.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// Clears a key from the table when dropped.
///
/// Owned by the generation task, so the marker goes away however the task ends,
/// panics included.
pub(crate) struct FlightGuard {
    in_flight: Arc<InFlight>,
    key: CacheKey,
}

impl FlightGuard {
    pub(crate) fn new(in_flight: Arc<InFlight>, key: CacheKey) -> Self {
        Self { in_flight, key }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight.finish(&self.key);
    }
}
