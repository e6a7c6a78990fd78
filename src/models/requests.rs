//! Request DTOs for the speech API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::audio::VariantOptions;

/// Longest text accepted for synthesis, in characters
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Longest language tag accepted (e.g. `en`, `pt-br`, `zh-CN`)
const MAX_LANG_LENGTH: usize = 16;

/// Request body for POST /speak
///
/// # Fields
/// - `text`: The text to speak (may be empty)
/// - `lang`: gTTS language tag
/// - `variant`: Optional encoding options; omitted fields take their defaults
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    pub lang: String,
    #[serde(default)]
    pub variant: VariantOptions,
}

impl SpeakRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.lang.is_empty() {
            return Some("Language cannot be empty".to_string());
        }
        if self.lang.len() > MAX_LANG_LENGTH
            || !self
                .lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Some(format!("Invalid language tag '{}'", self.lang));
        }
        if self.text.chars().count() > MAX_TEXT_LENGTH {
            return Some(format!(
                "Text exceeds maximum length of {} characters",
                MAX_TEXT_LENGTH
            ));
        }
        if self.variant.sample_rate_hz == 0 || self.variant.bitrate_kbps == 0 {
            return Some("Sample rate and bitrate must be positive".to_string());
        }
        None
    }
}
