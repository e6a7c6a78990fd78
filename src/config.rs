//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Shortest sweep interval accepted from the environment, in seconds
const MIN_SWEEP_INTERVAL_SECS: u64 = 1;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cached audio clips
    pub max_entries: usize,
    /// Maximum age of a cached clip, in seconds
    pub cache_ttl: u64,
    /// Sweeper interval in seconds (defaults to the TTL)
    pub sweep_interval: u64,
    /// Budget for one synthesis run, in seconds
    pub synthesis_timeout: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Text-to-speech program
    pub gtts_program: String,
    /// Transcoder program
    pub ffmpeg_program: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cached clips (default: 100)
    /// - `CACHE_TTL_SECS` - Entry TTL in seconds (default: 10800, three hours)
    /// - `SWEEP_INTERVAL_SECS` - Sweeper frequency in seconds (default: the TTL,
    ///   capped at the TTL, at least 1)
    /// - `SYNTHESIS_TIMEOUT_SECS` - Synthesis budget in seconds (default: 30)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `GTTS_PROGRAM` - gTTS CLI path (default: `gtts-cli`)
    /// - `FFMPEG_PROGRAM` - ffmpeg path (default: `ffmpeg`)
    ///
    /// Unset or unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let cache_ttl = parse_var("CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl);

        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cache_ttl,
            sweep_interval: parse_var("SWEEP_INTERVAL_SECS")
                .unwrap_or(cache_ttl)
                .min(cache_ttl)
                .max(MIN_SWEEP_INTERVAL_SECS),
            synthesis_timeout: parse_var("SYNTHESIS_TIMEOUT_SECS")
                .unwrap_or(defaults.synthesis_timeout),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            gtts_program: env::var("GTTS_PROGRAM").unwrap_or(defaults.gtts_program),
            ffmpeg_program: env::var("FFMPEG_PROGRAM").unwrap_or(defaults.ffmpeg_program),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 100,
            cache_ttl: 3 * 60 * 60,
            sweep_interval: 3 * 60 * 60,
            synthesis_timeout: 30,
            server_port: 8080,
            gtts_program: "gtts-cli".to_string(),
            ffmpeg_program: "ffmpeg".to_string(),
        }
    }
}
