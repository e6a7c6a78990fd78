//! Error types for the speech cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Synthesis Error ==
/// Failure reported by a synthesis collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// The external program is missing, failed to start or exited non-zero
    #[error("Synthesis unavailable: {0}")]
    Unavailable(String),

    /// Transcoding or post-processing of the synthesized audio failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

// == Fetch Error ==
/// Failure of a get-or-generate fetch. A cache miss is never an error.
///
/// Cloneable because one in-flight generation may answer several callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The collaborator failed; nothing was cached
    #[error("Audio generation failed: {0}")]
    GenerationFailed(#[from] SynthesisError),

    /// The collaborator exceeded its budget; nothing was cached
    #[error("Audio generation timed out after {0:?}")]
    Timeout(Duration),
}

// == API Error Enum ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream synthesis failed
    #[error("{0}")]
    GenerationFailed(String),

    /// Upstream synthesis took too long
    #[error("{0}")]
    Timeout(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::GenerationFailed(_) => ApiError::GenerationFailed(err.to_string()),
            FetchError::Timeout(_) => ApiError::Timeout(err.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn error_body(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_fetch_error_from_synthesis_error() {
        let err: FetchError = SynthesisError::Unavailable("gtts-cli not found".into()).into();
        assert!(matches!(err, FetchError::GenerationFailed(_)));
        assert!(err.to_string().contains("gtts-cli not found"));
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases = vec![
            (ApiError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (
                FetchError::GenerationFailed(SynthesisError::EncodingFailed("x".into())).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                FetchError::Timeout(Duration::from_secs(1)).into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (ApiError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let (status, json) = error_body(err).await;
            assert_eq!(status, expected);
            assert!(json["error"].is_string(), "error field should be a string");
        }
    }

    #[tokio::test]
    async fn test_timeout_message_mentions_budget() {
        let (_, json) = error_body(FetchError::Timeout(Duration::from_secs(5)).into()).await;
        assert!(json["error"].as_str().unwrap().contains("timed out"));
    }
}
