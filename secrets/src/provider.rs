//! The [`SecretProvider`] seam.

use crate::SecretError;
use async_trait::async_trait;

/// Source of named secrets.
///
/// Every call is a fresh lookup; implementations do not cache values.
/// Callers that read a secret repeatedly should keep the value themselves.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch the value of `name`.
    ///
    /// # Errors
    ///
    /// - [`SecretError::InvalidName`] if `name` is empty or malformed
    /// - [`SecretError::NotFound`] if no such secret exists
    /// - [`SecretError::Empty`] if its value is null or empty
    /// - [`SecretError::Auth`] if credentials are missing or rejected
    /// - any other variant unchanged
    async fn get_secret(&self, name: &str) -> Result<String, SecretError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Check that `name` is a valid vault secret name: 1 to 127 ASCII
/// alphanumerics or hyphens.
///
/// # Errors
///
/// Returns [`SecretError::InvalidName`] otherwise.
pub fn validate_name(name: &str) -> Result<(), SecretError> {
    let valid = !name.is_empty()
        && name.len() <= 127
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');

    if valid {
        Ok(())
    } else {
        Err(SecretError::InvalidName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("SESSION-SECRET-KEY").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("db/user").is_err());
        assert!(validate_name(&"a".repeat(128)).is_err());
    }
}
