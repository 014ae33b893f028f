//! # Posgrado Secrets
//!
//! Named-secret lookup behind the [`SecretProvider`] trait.
//!
//! ## Backends
//!
//! - [`KeyVaultClient`]: Azure Key Vault over REST, authenticated with an
//!   [`AmbientCredential`] resolved from the environment
//! - [`EnvSecretProvider`]: environment variables, for local development
//! - [`InMemorySecretProvider`]: fixed values, for tests
//!
//! Failures are typed ([`SecretError`]) and convert into the application
//! taxonomy through `From<SecretError> for AppError`:
//!
//! | `SecretError`              | `ErrorKind`      | Status |
//! |----------------------------|------------------|--------|
//! | `InvalidName`              | `Application`    | 400    |
//! | `NotFound`                 | `SecretNotFound` | 404    |
//! | `Empty`                    | `SecretEmpty`    | 400    |
//! | `Auth`                     | `VaultAuth`      | 503    |
//! | `Unexpected`, `Transport`  | `Internal`       | 500    |
//!
//! ## Example
//!
//! ```no_run
//! use posgrado_secrets::{KeyVaultClient, SecretProvider};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), posgrado_secrets::SecretError> {
//! let vault = KeyVaultClient::from_env("posgrado", Duration::from_secs(10))?;
//! let user = vault.get_secret("DB-USER").await?;
//! # Ok(())
//! # }
//! ```

pub mod credential;
pub mod env;
pub mod error;
pub mod key_vault;
pub mod memory;
pub mod provider;
pub mod retry;

pub use credential::AmbientCredential;
pub use env::EnvSecretProvider;
pub use error::SecretError;
pub use key_vault::KeyVaultClient;
pub use memory::InMemorySecretProvider;
pub use provider::SecretProvider;
