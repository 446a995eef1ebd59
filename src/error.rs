//! Error types for the badge server
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
/// Errors raised by the memoization layer.
///
/// The store itself is total; only key templates can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key template is malformed or does not match the call arguments
    #[error("Invalid key template: {0}")]
    Template(String),
}

// == App Error Enum ==
/// Unified error type for the badge server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Memoization layer failure
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Transport-level failure talking to GitHub
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status
    #[error("GitHub returned {status} for {url}")]
    Upstream { status: u16, url: String },

    /// Requested repository layout or route does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream payload had an unexpected shape or encoding
    #[error("Decode error: {0}")]
    Decode(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Http(_) | AppError::Upstream { .. } | AppError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the badge server.
pub type Result<T> = std::result::Result<T, AppError>;
