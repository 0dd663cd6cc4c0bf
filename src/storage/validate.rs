//! Access Control and Size Limits
//!
//! Checks shared by the write and read paths. Each check is a small function
//! returning `Result<(), StoreError>` so the store can chain them with `?` in
//! the order that decides which error a caller sees first.

use crate::storage::error::{AuthFailure, StoreError};
use subtle::ConstantTimeEq;

/// Longest accepted key, in bytes.
pub const MAX_KEY_LEN: usize = 100;

/// Longest accepted value, in bytes.
pub const MAX_VALUE_LEN: usize = 1000;

/// Compares the presented token against the shared secret.
///
/// The byte comparison runs in constant time. The length check does not, which
/// only leaks the secret's length.
pub fn check_token(presented: &str, secret: &str) -> Result<(), StoreError> {
    if presented.is_empty() {
        return Err(StoreError::Unauthorized(AuthFailure::MissingToken));
    }

    let presented = presented.as_bytes();
    let secret = secret.as_bytes();

    // An empty secret can never be matched: the empty token was refused above.
    if presented.len() != secret.len() || !bool::from(presented.ct_eq(secret)) {
        return Err(StoreError::Unauthorized(AuthFailure::InvalidToken));
    }

    Ok(())
}

pub fn check_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::MissingKey);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::KeyTooLong);
    }
    Ok(())
}

pub fn check_value(value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::MissingValue);
    }
    if value.len() > MAX_VALUE_LEN {
        return Err(StoreError::ValueTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_token() {
        assert_eq!(check_token("secret123", "secret123"), Ok(()));
        assert_eq!(
            check_token("", "secret123"),
            Err(StoreError::Unauthorized(AuthFailure::MissingToken))
        );
        assert_eq!(
            check_token("secret124", "secret123"),
            Err(StoreError::Unauthorized(AuthFailure::InvalidToken))
        );
        assert_eq!(
            check_token("secret12", "secret123"),
            Err(StoreError::Unauthorized(AuthFailure::InvalidToken))
        );
    }

    #[test]
    fn test_empty_secret_rejects_everything() {
        assert_eq!(
            check_token("", ""),
            Err(StoreError::Unauthorized(AuthFailure::MissingToken))
        );
        assert_eq!(
            check_token("anything", ""),
            Err(StoreError::Unauthorized(AuthFailure::InvalidToken))
        );
    }

    #[test]
    fn test_check_key_limits() {
        assert_eq!(check_key(""), Err(StoreError::MissingKey));
        assert_eq!(check_key(&"k".repeat(MAX_KEY_LEN)), Ok(()));
        assert_eq!(
            check_key(&"k".repeat(MAX_KEY_LEN + 1)),
            Err(StoreError::KeyTooLong)
        );
    }

    #[test]
    fn test_check_value_limits() {
        assert_eq!(check_value(""), Err(StoreError::MissingValue));
        assert_eq!(check_value(&"v".repeat(MAX_VALUE_LEN)), Ok(()));
        assert_eq!(
            check_value(&"v".repeat(MAX_VALUE_LEN + 1)),
            Err(StoreError::ValueTooLong)
        );
    }

    #[test]
    fn test_lengths_are_bytes() {
        // 34 three-byte characters = 102 bytes
        let key = "€".repeat(34);
        assert_eq!(check_key(&key), Err(StoreError::KeyTooLong));
    }
}
