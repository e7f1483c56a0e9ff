//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Producer failures are
//! never wrapped in this type; `get_or_set` hands them back untouched.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its admin API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or exceeds the maximum length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// TTL is too large to be represented as an expiry instant
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in cache (admin API only; the cache itself returns `None`)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey(_)
            | CacheError::InvalidTtl(_)
            | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = vec![
            (CacheError::InvalidKey("".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidTtl("big".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (CacheError::NotFound("key".into()), StatusCode::NOT_FOUND),
            (CacheError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_error_converts_into_anyhow() {
        let err: anyhow::Error = CacheError::InvalidKey("key cannot be empty".into()).into();
        assert!(err.to_string().contains("key cannot be empty"));
        assert!(err.downcast_ref::<CacheError>().is_some());
    }
}
