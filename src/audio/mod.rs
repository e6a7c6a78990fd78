//! Audio Module
//!
//! The cache-fronted audio service: variant options, request coalescing and the
//! get-or-generate fetcher.

mod fetcher;
mod inflight;
mod variant;

pub use fetcher::AudioFetcher;
pub use inflight::{InFlight, SharedFetch};
pub use variant::{AudioCodec, VariantOptions};
