//! Audio Variant Module
//!
//! Encoding options that change the bytes produced for a given text and language.

use serde::{Deserialize, Serialize};

// == Audio Codec ==
/// Container/codec of the transcoded audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Mp3,
    Ogg,
}

impl AudioCodec {
    /// Format name understood by `ffmpeg -f`.
    pub fn format_name(self) -> &'static str {
        match self {
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Ogg => "ogg",
        }
    }

    /// Stable single-byte tag used when deriving cache keys.
    pub(crate) fn tag(self) -> u8 {
        match self {
            AudioCodec::Mp3 => 1,
            AudioCodec::Ogg => 2,
        }
    }
}

// == Variant Options ==
/// Every knob that alters the synthesized payload.
///
/// Defaults reproduce the low-bandwidth profile the service has always served:
/// 8 kHz MP3 at 32 kbps, leading/trailing silence trimmed, gzip on top.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantOptions {
    /// Output codec
    pub codec: AudioCodec,
    /// Output sample rate in Hz
    pub sample_rate_hz: u32,
    /// Output bitrate in kbps
    pub bitrate_kbps: u32,
    /// Strip silence at the start and end of the clip
    pub trim_silence: bool,
    /// Gzip the encoded audio before caching/returning it
    pub gzip: bool,
}

impl Default for VariantOptions {
    fn default() -> Self {
        Self {
            codec: AudioCodec::Mp3,
            sample_rate_hz: 8000,
            bitrate_kbps: 32,
            trim_silence: true,
            gzip: true,
        }
    }
}
