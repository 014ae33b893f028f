//! Azure Key Vault REST client.

use crate::credential::{AmbientCredential, truncate};
use crate::retry::{RetryPolicy, retry_with_predicate};
use crate::{SecretError, SecretProvider, provider::validate_name};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Key Vault REST API version.
pub const API_VERSION: &str = "7.4";

#[derive(Deserialize)]
struct SecretBundle {
    #[serde(default)]
    value: Option<String>,
}

/// Reads secrets from one Azure Key Vault.
///
/// Every [`get_secret`](SecretProvider::get_secret) call performs a live
/// `GET {vault}/secrets/{name}`; values are never cached.
#[derive(Debug)]
pub struct KeyVaultClient {
    vault_url: String,
    http: reqwest::Client,
    credential: AmbientCredential,
    retry: RetryPolicy,
}

impl KeyVaultClient {
    /// Client for `vault_url` authenticating with `credential`.
    #[must_use]
    pub fn new(
        vault_url: impl Into<String>,
        http: reqwest::Client,
        credential: AmbientCredential,
    ) -> Self {
        Self {
            vault_url: vault_url.into().trim_end_matches('/').to_string(),
            http,
            credential,
            retry: RetryPolicy::default(),
        }
    }

    /// Client for the vault named `vault_name`, with credentials taken from
    /// the environment and every request bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Transport`] if the HTTP client cannot be built.
    pub fn from_env(vault_name: &str, timeout: Duration) -> Result<Self, SecretError> {
        let http = http_client(timeout)?;
        let credential = AmbientCredential::from_env(http.clone());
        tracing::info!(
            vault = vault_name,
            credential = credential.kind(),
            "Configured Azure Key Vault client"
        );
        Ok(Self::new(vault_url_for(vault_name), http, credential))
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Base URL of the vault.
    #[must_use]
    pub fn vault_url(&self) -> &str {
        &self.vault_url
    }

    async fn fetch_once(&self, name: &str) -> Result<String, SecretError> {
        let token = self.credential.token().await?;

        let response = self
            .http
            .get(format!("{}/secrets/{name}", self.vault_url))
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status().as_u16();
        match status {
            200 => {
                let bundle: SecretBundle = response.json().await?;
                match bundle.value {
                    Some(value) if !value.is_empty() => Ok(value),
                    _ => Err(SecretError::Empty {
                        name: name.to_string(),
                    }),
                }
            }
            404 => Err(SecretError::NotFound {
                name: name.to_string(),
            }),
            401 | 403 => Err(SecretError::Auth(format!(
                "vault rejected the access token with status {status}"
            ))),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(SecretError::Unexpected {
                    status,
                    body: truncate(&body),
                })
            }
        }
    }
}

#[async_trait]
impl SecretProvider for KeyVaultClient {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        validate_name(name)?;

        let result = retry_with_predicate(
            &self.retry,
            || self.fetch_once(name),
            SecretError::is_retryable,
        )
        .await;

        match &result {
            Ok(_) => tracing::debug!(secret = name, "Secret retrieved from Key Vault"),
            Err(err) => tracing::warn!(secret = name, error = %err, "Secret lookup failed"),
        }
        result
    }

    fn backend(&self) -> &'static str {
        "keyvault"
    }
}

/// `https://{vault_name}.vault.azure.net`, or `vault_name` itself if it is already a URL.
#[must_use]
pub fn vault_url_for(vault_name: &str) -> String {
    if vault_name.starts_with("https://") || vault_name.starts_with("http://") {
        vault_name.trim_end_matches('/').to_string()
    } else {
        format!("https://{vault_name}.vault.azure.net")
    }
}

/// HTTP client with a per-request timeout.
///
/// # Errors
///
/// Returns [`SecretError::Transport`] if the TLS backend cannot initialise.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, SecretError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()?)
}
