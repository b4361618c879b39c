//! Error types for the cache node
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache node.
///
/// The type is `Clone` so the single-flight coordinator can broadcast one
/// leader's error to every waiting caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A lookup was attempted with an empty key
    #[error("key is required")]
    KeyRequired,

    /// Malformed request data, e.g. a peer request with a bad path shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A request named a group that is not in the registry
    #[error("No such group: {0}")]
    UnknownGroup(String),

    /// The origin loader returned an error; surfaced verbatim, never cached
    #[error("Loader error: {0}")]
    Loader(String),

    /// Transport error or non-OK status from a peer; recovered by falling
    /// back to the local loader, so callers normally never see this
    #[error("Peer error: {0}")]
    Peer(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::KeyRequired => StatusCode::BAD_REQUEST,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::UnknownGroup(_) => StatusCode::NOT_FOUND,
            CacheError::Loader(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
