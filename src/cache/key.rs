//! Cache Key Module
//!
//! Derives fixed-width cache keys from everything that shapes a synthesized payload.
//!
//! Keys are SHA-256 digests (256 bits). The birthday bound for that width sits
//! around 2^128 distinct requests, so serving one request's audio for another's
//! is not a practical concern. It is still a hash: the probability is negligible,
//! not zero.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::audio::VariantOptions;

// == Cache Key ==
/// Opaque 32-byte identifier of a synthesis request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    // == Derive ==
    /// Derives the key for `(text, lang, variant)`.
    ///
    /// Pure and total: empty text and empty language are valid inputs.
    /// Strings are length-prefixed so field boundaries can't shift between inputs.
    pub fn derive(text: &str, lang: &str, variant: &VariantOptions) -> Self {
        let mut hasher = Sha256::new();
        write_str(&mut hasher, text);
        write_str(&mut hasher, lang);
        hasher.update([variant.codec.tag()]);
        hasher.update(variant.sample_rate_hz.to_le_bytes());
        hasher.update(variant.bitrate_kbps.to_le_bytes());
        hasher.update([variant.trim_silence as u8, variant.gzip as u8]);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form keeps log lines readable
        write!(f, "CacheKey({})", &self.to_hex()[..12])
    }
}
