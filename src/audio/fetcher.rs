//! Audio Fetcher Module
//!
//! Get-or-generate entry point used by request handlers.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::inflight::{FlightGuard, InFlight};
use super::VariantOptions;
use crate::cache::{CacheKey, SharedStore};
use crate::error::{FetchError, SynthesisError};
use crate::synth::Synthesizer;

// Keeps `now + timeout` representable for absurd timeouts
const MAX_TIMEOUT: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

// == Audio Fetcher ==
/// Serves audio from the cache, generating and caching it on a miss.
///
/// Concurrent misses on the same key share one generation. The generation runs
/// on its own task with no store lock held, and writes to the store only once
/// the synthesizer succeeds inside its time budget. A failed or timed-out
/// generation leaves the store untouched.
#[derive(Clone)]
pub struct AudioFetcher {
    store: SharedStore,
    synthesizer: Arc<dyn Synthesizer>,
    in_flight: Arc<InFlight>,
    default_timeout: Duration,
}

impl AudioFetcher {
    // == Constructor ==
    pub fn new(
        store: SharedStore,
        synthesizer: Arc<dyn Synthesizer>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            store,
            synthesizer,
            in_flight: Arc::new(InFlight::new()),
            default_timeout,
        }
    }

    // == Fetch ==
    /// Returns the audio for `(text, lang, variant)` within the default timeout.
    pub async fn fetch(
        &self,
        text: &str,
        lang: &str,
        variant: &VariantOptions,
    ) -> Result<Bytes, FetchError> {
        self.fetch_with_timeout(text, lang, variant, self.default_timeout)
            .await
    }

    /// Returns the audio for `(text, lang, variant)`, waiting at most `timeout`.
    ///
    /// A hit returns immediately without touching the synthesizer. On a miss the
    /// caller joins the pending generation for the key or starts one. A caller
    /// that starts a generation hands its deadline to the generation task, which
    /// covers the store write too; one that joins only bounds its own wait.
    pub async fn fetch_with_timeout(
        &self,
        text: &str,
        lang: &str,
        variant: &VariantOptions,
        timeout: Duration,
    ) -> Result<Bytes, FetchError> {
        self.fetch_keyed(text, lang, variant, timeout)
            .await
            .map(|(_, payload)| payload)
    }

    /// Same as [`fetch_with_timeout`](Self::fetch_with_timeout), also returning
    /// the key the payload is cached under.
    pub async fn fetch_keyed(
        &self,
        text: &str,
        lang: &str,
        variant: &VariantOptions,
        timeout: Duration,
    ) -> Result<(CacheKey, Bytes), FetchError> {
        let deadline = Instant::now() + timeout.min(MAX_TIMEOUT);
        let key = CacheKey::derive(text, lang, variant);

        let cached = self.store.lock().await.get(&key);
        if let Some(payload) = cached {
            debug!(%key, bytes = payload.len(), "Cache hit");
            return Ok((key, payload));
        }

        let (flight, started) = self.in_flight.join_or_start(key, || {
            self.generate(key, text, lang, variant, deadline, timeout)
        });

        let result = if started {
            debug!(%key, lang, "Cache miss, generating audio");
            // The task enforces the deadline, so its outcome matches what it stored
            flight.await
        } else {
            debug!(%key, "Cache miss, joining pending generation");
            match tokio::time::timeout_at(deadline, flight).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout)),
            }
        };
        result.map(|payload| (key, payload))
    }

    // == Accessors ==
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Number of keys currently being generated.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Spawns the generation task for `key` and returns a future of its result.
    fn generate(
        &self,
        key: CacheKey,
        text: &str,
        lang: &str,
        variant: &VariantOptions,
        deadline: Instant,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<Bytes, FetchError>> {
        let store = self.store.clone();
        let synthesizer = self.synthesizer.clone();
        let guard = FlightGuard::new(self.in_flight.clone(), key);
        let (text, lang, variant) = (text.to_owned(), lang.to_owned(), variant.clone());

        let task = tokio::spawn(async move {
            let _guard = guard;
            let generation =
                generate_and_store(&store, synthesizer.as_ref(), key, &text, &lang, &variant);
            match tokio::time::timeout_at(deadline, generation).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        %key,
                        timeout_ms = timeout.as_millis() as u64,
                        "Audio generation timed out"
                    );
                    Err(FetchError::Timeout(timeout))
                }
            }
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(FetchError::GenerationFailed(SynthesisError::Unavailable(
                    format!("synthesis task failed: {}", e),
                ))),
            }
        }
        .boxed()
    }
}

/// Synthesizes and caches `key`. Dropping the future before it completes
/// leaves the store untouched.
async fn generate_and_store(
    store: &SharedStore,
    synthesizer: &dyn Synthesizer,
    key: CacheKey,
    text: &str,
    lang: &str,
    variant: &VariantOptions,
) -> Result<Bytes, FetchError> {
    // A generation that finished between the caller's miss and now already cached it
    let cached = store.lock().await.peek(&key);
    if let Some(payload) = cached {
        return Ok(payload);
    }

    let started = Instant::now();
    let payload = match synthesizer.synthesize(text, lang, variant).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(%key, lang, error = %e, "Audio generation failed");
            return Err(e.into());
        }
    };

    store.lock().await.set(key, payload.clone());
    info!(
        %key,
        lang,
        bytes = payload.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generated and cached audio"
    );
    Ok(payload)
}
