//! Error types for the cache service
//!
//! Backend failures are absorbed by the coordinator; these errors surface only
//! from backends themselves and from the admin API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache backends and the admin API.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Remote backing store returned an error
    #[error("Remote store error: {0}")]
    Remote(#[from] redis::RedisError),

    /// A backend operation did not finish in time
    #[error("Cache operation timed out after {0}ms")]
    Timeout(u64),

    /// Backend could not be reached
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Remote(_) | CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_error_body_is_json_with_message() {
        let response = CacheError::InvalidRequest("empty key".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Invalid request: empty key");
    }

    #[test]
    fn test_error_status_codes() {
        let cases = vec![
            (CacheError::Timeout(500), StatusCode::GATEWAY_TIMEOUT),
            (CacheError::Unavailable("down".to_string()), StatusCode::SERVICE_UNAVAILABLE),
            (CacheError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
