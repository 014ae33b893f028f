//! Environment-backed secrets for local development.

use crate::{SecretError, SecretProvider, provider::validate_name};
use async_trait::async_trait;
use std::collections::HashMap;

/// Reads secrets from environment variables.
///
/// A vault name maps to a variable by upper-casing it and replacing hyphens
/// with underscores: `DB-USER` is read from `DB_USER`.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretProvider {
    vars: HashMap<String, String>,
}

impl EnvSecretProvider {
    /// Snapshot the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Use an explicit set of variables.
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Environment variable holding the secret `name`.
    #[must_use]
    pub fn variable_for(name: &str) -> String {
        name.replace('-', "_").to_ascii_uppercase()
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        validate_name(name)?;

        match self.vars.get(&Self::variable_for(name)) {
            None => Err(SecretError::NotFound {
                name: name.to_string(),
            }),
            Some(value) if value.is_empty() => Err(SecretError::Empty {
                name: name.to_string(),
            }),
            Some(value) => Ok(value.clone()),
        }
    }

    fn backend(&self) -> &'static str {
        "env"
    }
}
