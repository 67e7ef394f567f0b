//! Error types for the group cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the group cache.
///
/// The type is `Clone` because one load result is handed to every caller
/// coalesced on the same key.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Invalid request data (e.g. an empty key)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Group not found in the registry
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user-supplied loader failed; shown verbatim
    #[error("{0}")]
    Loader(Arc<anyhow::Error>),

    /// A remote peer could not serve the request
    #[error("Peer error: {0}")]
    Peer(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps a loader failure so it can be shared between waiters.
    pub fn loader(err: anyhow::Error) -> Self {
        CacheError::Loader(Arc::new(err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Loader(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the group cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_error_display_is_verbatim() {
        let err = CacheError::loader(anyhow::anyhow!("Kate not exist"));
        assert_eq!(err.to_string(), "Kate not exist");
    }

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (CacheError::InvalidRequest("key".to_string()), StatusCode::BAD_REQUEST),
            (CacheError::NotFound("group".to_string()), StatusCode::NOT_FOUND),
            (
                CacheError::loader(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (CacheError::Peer("down".to_string()), StatusCode::BAD_GATEWAY),
            (CacheError::Internal("error".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(
                response.status(),
                expected_status,
                "Error should map to correct HTTP status"
            );
        }
    }
}
