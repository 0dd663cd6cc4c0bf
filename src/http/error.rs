//! Mapping of relay errors onto HTTP responses.
//!
//! Every failure gets its own short body so scripts on the other end can tell
//! them apart without parsing anything. The bodies are part of the wire
//! contract; changing one breaks existing clients.

use crate::storage::{AuthFailure, StoreError};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Body returned by `/get` for a key with no entry.
pub const NOT_FOUND_BODY: &str = "{\"error\": \"invalid key\"}";

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The query string or form body could not be decoded.
    #[error("invalid form data")]
    InvalidForm,

    /// `/sweep` was called without the scheduler's origin header.
    #[error("invalid cron request")]
    UntrustedSweep,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::InvalidForm => StatusCode::BAD_REQUEST,
            ApiError::UntrustedSweep => StatusCode::FORBIDDEN,
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            ApiError::Store(StoreError::Unauthorized(AuthFailure::MissingToken)) => {
                "no token provided"
            }
            ApiError::Store(StoreError::Unauthorized(AuthFailure::InvalidToken)) => "invalid token",
            ApiError::Store(StoreError::MissingKey) => "no key",
            ApiError::Store(StoreError::KeyTooLong) => "key is too long",
            ApiError::Store(StoreError::MissingValue) => "no value",
            ApiError::Store(StoreError::ValueTooLong) => "data is too long",
            ApiError::Store(StoreError::NotFound) => NOT_FOUND_BODY,
            ApiError::InvalidForm => "invalid form data",
            ApiError::UntrustedSweep => "invalid cron request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let content_type = match self {
            ApiError::Store(StoreError::NotFound) => "application/json",
            _ => "text/plain; charset=utf-8",
        };

        (
            self.status(),
            [(header::CONTENT_TYPE, content_type)],
            self.body(),
        )
            .into_response()
    }
}
