//! API Handlers
//!
//! HTTP request handlers for each speech service endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::audio::AudioFetcher;
use crate::cache::{CacheStore, SharedStore};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{HealthResponse, SpeakRequest, SpeakResponse, StatsResponse};
use crate::synth::Synthesizer;

/// Application state shared across all handlers.
///
/// The store is built once at startup and injected here; handlers reach it only
/// through the fetcher or for read-only stats.
#[derive(Clone)]
pub struct AppState {
    /// Get-or-generate front door
    pub fetcher: AudioFetcher,
}

impl AppState {
    /// Creates a new AppState around an existing fetcher.
    pub fn new(fetcher: AudioFetcher) -> Self {
        Self { fetcher }
    }

    /// Creates a new AppState from configuration and a synthesizer.
    pub fn from_config(config: &Config, synthesizer: Arc<dyn Synthesizer>) -> Self {
        let store = CacheStore::new(config.max_entries, config.ttl()).into_shared();
        Self::new(AudioFetcher::new(
            store,
            synthesizer,
            config.synthesis_timeout(),
        ))
    }

    /// The shared cache store, e.g. for the sweeper.
    pub fn store(&self) -> SharedStore {
        self.fetcher.store().clone()
    }
}

/// Handler for POST /speak
///
/// Returns cached audio for the request, synthesizing it on a miss.
pub async fn speak_handler(
    State(state): State<AppState>,
    Json(req): Json<SpeakRequest>,
) -> Result<Json<SpeakResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let fetcher = &state.fetcher;
    let (key, payload) = fetcher
        .fetch_keyed(&req.text, &req.lang, &req.variant, fetcher.default_timeout())
        .await?;

    Ok(Json(SpeakResponse::new(&key, &payload, &req.variant)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let (stats, capacity, ttl) = {
        let store = state.fetcher.store().lock().await;
        (store.stats(), store.capacity(), store.ttl())
    };

    Json(StatsResponse::new(
        &stats,
        capacity,
        ttl.as_secs(),
        state.fetcher.in_flight(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
