//! Speech Cache - text-to-speech behind a bounded in-memory audio cache
//!
//! Synthesized clips are cached by a SHA-256 key of (text, language, encoding
//! options), expire after a TTL, and are evicted least-recently-used first when
//! the cache is full. Concurrent requests for the same uncached clip share a
//! single synthesis run.

pub mod api;
pub mod audio;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod synth;
pub mod tasks;

pub use api::AppState;
pub use audio::{AudioFetcher, VariantOptions};
pub use config::Config;
pub use tasks::spawn_sweeper;
