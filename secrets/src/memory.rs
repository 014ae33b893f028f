//! In-memory secrets for tests.

use crate::{SecretError, SecretProvider, provider::validate_name};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
enum Entry {
    Value(String),
    Null,
    AuthFailure,
}

/// Fixed set of secrets, with a lookup counter.
///
/// # Example
///
/// ```
/// use posgrado_secrets::{InMemorySecretProvider, SecretProvider};
///
/// # tokio_test::block_on(async {
/// let secrets = InMemorySecretProvider::new().with_secret("SESSION-SECRET-KEY", "s3cr3t");
/// assert_eq!(secrets.get_secret("SESSION-SECRET-KEY").await.ok().as_deref(), Some("s3cr3t"));
/// assert_eq!(secrets.lookups(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemorySecretProvider {
    entries: HashMap<String, Entry>,
    lookups: AtomicUsize,
}

impl InMemorySecretProvider {
    /// Provider with no secrets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value (an empty string behaves like a blank vault entry).
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Entry::Value(value.into()));
        self
    }

    /// Store an entry with no value.
    #[must_use]
    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Entry::Null);
        self
    }

    /// Make lookups of `name` fail as if credentials were rejected.
    #[must_use]
    pub fn with_auth_failure(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Entry::AuthFailure);
        self
    }

    /// Number of lookups performed so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretProvider for InMemorySecretProvider {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        validate_name(name)?;

        match self.entries.get(name) {
            None => Err(SecretError::NotFound {
                name: name.to_string(),
            }),
            Some(Entry::Null) => Err(SecretError::Empty {
                name: name.to_string(),
            }),
            Some(Entry::Value(value)) if value.is_empty() => Err(SecretError::Empty {
                name: name.to_string(),
            }),
            Some(Entry::Value(value)) => Ok(value.clone()),
            Some(Entry::AuthFailure) => Err(SecretError::Auth(format!(
                "credential rejected while reading '{name}'"
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
