//! Secret retrieval errors.

use posgrado_core::AppError;
use thiserror::Error;

/// Errors raised while resolving a secret.
#[derive(Error, Debug)]
pub enum SecretError {
    /// The name is empty or contains characters a vault name cannot hold.
    #[error("Invalid secret name '{name}'")]
    InvalidName {
        /// Rejected name.
        name: String,
    },

    /// No secret with this name exists.
    #[error("Secret '{name}' not found")]
    NotFound {
        /// Requested name.
        name: String,
    },

    /// The secret exists but its value is null or empty.
    #[error("Secret '{name}' is empty")]
    Empty {
        /// Requested name.
        name: String,
    },

    /// Credentials could not be obtained or were rejected.
    #[error("Vault authentication failed: {0}")]
    Auth(String),

    /// The vault answered with a status this client does not handle.
    #[error("Unexpected vault response (status {status}): {body}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Network or decoding failure.
    #[error("Vault request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SecretError {
    /// Whether the lookup may succeed if repeated.
    ///
    /// Transport failures, throttling and server errors are transient;
    /// everything else is a definite answer.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Unexpected { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidName { .. } | Self::NotFound { .. } | Self::Empty { .. } | Self::Auth(_) => {
                false
            }
        }
    }
}

impl From<SecretError> for AppError {
    fn from(err: SecretError) -> Self {
        match err {
            SecretError::InvalidName { name } => {
                Self::application(format!("Invalid secret name '{name}'."))
            }
            SecretError::NotFound { name } => {
                Self::secret_not_found(format!("Secret '{name}' not found in Azure Key Vault."))
            }
            SecretError::Empty { name } => {
                Self::secret_empty(format!("Secret '{name}' is empty in Azure Key Vault."))
            }
            err @ SecretError::Auth(_) => {
                Self::vault_auth("Error authenticating with Azure Key Vault.").with_source(err)
            }
            err @ (SecretError::Unexpected { .. } | SecretError::Transport(_)) => {
                Self::internal("Unexpected error while retrieving a secret.").with_source(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posgrado_core::ErrorKind;

    #[test]
    fn test_app_error_mapping() {
        let cases = [
            (SecretError::InvalidName { name: String::new() }, ErrorKind::Application),
            (SecretError::NotFound { name: "DB-USER".into() }, ErrorKind::SecretNotFound),
            (SecretError::Empty { name: "DB-USER".into() }, ErrorKind::SecretEmpty),
            (SecretError::Auth("expired".into()), ErrorKind::VaultAuth),
            (
                SecretError::Unexpected { status: 500, body: String::new() },
                ErrorKind::Internal,
            ),
        ];

        for (err, kind) in cases {
            assert_eq!(AppError::from(err).kind(), kind);
        }
    }

    #[test]
    fn test_auth_detail_is_not_user_facing() {
        let app: AppError = SecretError::Auth("AADSTS7000215: invalid client secret".into()).into();
        assert!(!app.message().contains("AADSTS"));
        assert!(app.cause().is_some());
    }

    #[test]
    fn test_retryable() {
        assert!(SecretError::Unexpected { status: 503, body: String::new() }.is_retryable());
        assert!(SecretError::Unexpected { status: 429, body: String::new() }.is_retryable());
        assert!(!SecretError::Unexpected { status: 400, body: String::new() }.is_retryable());
        assert!(!SecretError::NotFound { name: "X".into() }.is_retryable());
        assert!(!SecretError::Auth(String::new()).is_retryable());
    }
}
