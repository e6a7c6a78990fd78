//! Synthesis Module
//!
//! The collaborator that turns text into encoded audio. The cache only ever sees
//! the [`Synthesizer`] trait; [`CommandSynthesizer`] is the production pipeline.

mod command;

use async_trait::async_trait;
use bytes::Bytes;

use crate::audio::VariantOptions;
use crate::error::SynthesisError;

pub use command::CommandSynthesizer;

/// Produces encoded audio for a text in a language.
///
/// Implementations must tolerate concurrent calls from independent cache misses.
#[async_trait]
pub trait Synthesizer: Send + Sync + 'static {
    async fn synthesize(
        &self,
        text: &str,
        lang: &str,
        variant: &VariantOptions,
    ) -> Result<Bytes, SynthesisError>;
}
