//! Response DTOs for the speech API
//!
//! Defines the structure of outgoing HTTP response bodies.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::audio::{AudioCodec, VariantOptions};
use crate::cache::{CacheKey, CacheStats};

/// Response body for POST /speak
#[derive(Debug, Clone, Serialize)]
pub struct SpeakResponse {
    /// Base64 of the payload (gzip-compressed audio unless disabled)
    pub audio: String,
    /// Hex cache key the payload is stored under
    pub key: String,
    /// Audio codec inside the payload
    pub codec: AudioCodec,
    /// `gzip` or `identity`
    pub encoding: String,
}

impl SpeakResponse {
    /// Creates a new SpeakResponse, base64-encoding the payload
    pub fn new(key: &CacheKey, payload: &[u8], variant: &VariantOptions) -> Self {
        Self {
            audio: STANDARD.encode(payload),
            key: key.to_hex(),
            codec: variant.codec,
            encoding: if variant.gzip { "gzip" } else { "identity" }.to_string(),
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub capacity: usize,
    pub ttl_secs: u64,
    /// Generations currently running
    pub in_flight: usize,
    /// Cache hit rate (hits / total requests)
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from store counters
    pub fn new(stats: &CacheStats, capacity: usize, ttl_secs: u64, in_flight: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            capacity,
            ttl_secs,
            in_flight,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status ("healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
