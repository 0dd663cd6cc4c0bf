//! Store Errors
//!
//! Every failure the store can report is a validation outcome: a bad
//! credential, a missing or oversized key or value, or a read miss. None of
//! them are transient, so callers never retry; they turn the error into a
//! response and move on.

/// Why a write was refused at the credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// The caller presented no token at all.
    MissingToken,
    /// The caller presented a token that does not match the shared secret.
    InvalidToken,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::MissingToken => f.write_str("no token provided"),
            AuthFailure::InvalidToken => f.write_str("invalid token"),
        }
    }
}

/// Errors returned by [`RelayStore`](crate::storage::RelayStore) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unauthorized: {0}")]
    Unauthorized(AuthFailure),

    #[error("no key")]
    MissingKey,

    #[error("key is too long")]
    KeyTooLong,

    #[error("no value")]
    MissingValue,

    #[error("value is too long")]
    ValueTooLong,

    #[error("key not found")]
    NotFound,
}

impl StoreError {
    /// Returns true for errors raised before any state could be touched
    /// because the caller was not allowed to write.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StoreError::Unauthorized(_))
    }
}
