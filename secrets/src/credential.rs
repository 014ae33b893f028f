//! Ambient Azure credentials.
//!
//! [`AmbientCredential::from_env`] picks the first source available, in order:
//!
//! 1. `AZURE_KEYVAULT_BEARER_TOKEN`: a pre-issued access token
//! 2. `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`: OAuth2
//!    client credentials against `AZURE_AUTHORITY_HOST`
//! 3. the instance metadata service (managed identity), optionally for the
//!    user-assigned identity named by `AZURE_CLIENT_ID`
//!
//! Access tokens are cached until shortly before they expire. Any failure to
//! obtain a token is reported as [`SecretError::Auth`].

use crate::SecretError;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default Microsoft Entra authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Instance metadata token endpoint.
pub const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// Resource / audience of Key Vault tokens.
pub const VAULT_RESOURCE: &str = "https://vault.azure.net";

const REFRESH_MARGIN: Duration = Duration::from_secs(60);
const DEFAULT_LIFETIME: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
enum Source {
    Static(String),
    ClientSecret {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    ManagedIdentity {
        endpoint: String,
        client_id: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    // IMDS sends `expires_in` as a string, the authority as a number.
    fn lifetime(&self) -> Duration {
        self.expires_in
            .as_ref()
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .map_or(DEFAULT_LIFETIME, Duration::from_secs)
    }

    fn expires_at(&self, now: Instant) -> Instant {
        now.checked_add(self.lifetime())
            .unwrap_or(now + DEFAULT_LIFETIME)
    }
}

/// Token source for Key Vault requests.
#[derive(Debug)]
pub struct AmbientCredential {
    source: Source,
    http: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl AmbientCredential {
    /// Resolve the credential chain from the process environment.
    #[must_use]
    pub fn from_env(http: reqwest::Client) -> Self {
        Self::from_lookup(http, |key| std::env::var(key).ok())
    }

    /// Resolve the credential chain from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(http: reqwest::Client, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = var("AZURE_KEYVAULT_BEARER_TOKEN") {
            tracing::debug!("Using static bearer token for Key Vault");
            return Self::static_token(http, token);
        }

        if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            var("AZURE_TENANT_ID"),
            var("AZURE_CLIENT_ID"),
            var("AZURE_CLIENT_SECRET"),
        ) {
            tracing::debug!(tenant_id = %tenant_id, "Using client credentials for Key Vault");
            let authority =
                var("AZURE_AUTHORITY_HOST").unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
            return Self::client_secret(http, authority, tenant_id, client_id, client_secret);
        }

        tracing::debug!("Using managed identity for Key Vault");
        Self::managed_identity(http, IMDS_TOKEN_ENDPOINT, var("AZURE_CLIENT_ID"))
    }

    /// Always present the same token.
    #[must_use]
    pub fn static_token(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self::with_source(http, Source::Static(token.into()))
    }

    /// OAuth2 client-credentials grant.
    #[must_use]
    pub fn client_secret(
        http: reqwest::Client,
        authority_host: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::with_source(
            http,
            Source::ClientSecret {
                authority_host: authority_host.into().trim_end_matches('/').to_string(),
                tenant_id: tenant_id.into(),
                client_id: client_id.into(),
                client_secret: client_secret.into(),
            },
        )
    }

    /// Managed identity through a metadata endpoint.
    #[must_use]
    pub fn managed_identity(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        client_id: Option<String>,
    ) -> Self {
        Self::with_source(
            http,
            Source::ManagedIdentity {
                endpoint: endpoint.into(),
                client_id,
            },
        )
    }

    fn with_source(http: reqwest::Client, source: Source) -> Self {
        Self {
            source,
            http,
            cache: Mutex::new(None),
        }
    }

    /// Short name of the active source, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self.source {
            Source::Static(_) => "static_token",
            Source::ClientSecret { .. } => "client_secret",
            Source::ManagedIdentity { .. } => "managed_identity",
        }
    }

    /// A valid access token, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Auth`] if no token can be obtained.
    pub async fn token(&self) -> Result<String, SecretError> {
        if let Source::Static(token) = &self.source {
            return Ok(token.clone());
        }

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
            return Ok(cached.value.clone());
        }

        let response = self.request_token().await?;
        let fresh = CachedToken {
            expires_at: response.expires_at(Instant::now()),
            value: response.access_token,
        };
        let token = fresh.value.clone();
        *cache = Some(fresh);
        drop(cache);

        tracing::debug!(source = self.kind(), "Acquired Key Vault access token");
        Ok(token)
    }

    async fn request_token(&self) -> Result<TokenResponse, SecretError> {
        let request = match &self.source {
            Source::Static(_) => {
                return Err(SecretError::Auth("static tokens are never refreshed".into()));
            }
            Source::ClientSecret {
                authority_host,
                tenant_id,
                client_id,
                client_secret,
            } => {
                let scope = format!("{VAULT_RESOURCE}/.default");
                self.http
                    .post(format!("{authority_host}/{tenant_id}/oauth2/v2.0/token"))
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                        ("scope", scope.as_str()),
                    ])
            }
            Source::ManagedIdentity { endpoint, client_id } => {
                let mut query = vec![("api-version", "2018-02-01"), ("resource", VAULT_RESOURCE)];
                if let Some(id) = client_id {
                    query.push(("client_id", id.as_str()));
                }
                self.http.get(endpoint).header("Metadata", "true").query(&query)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| SecretError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SecretError::Auth(format!(
                "token endpoint answered {}: {}",
                status.as_u16(),
                truncate(&body)
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| SecretError::Auth(format!("malformed token response: {e}")))
    }
}

pub(crate) fn truncate(body: &str) -> String {
    const LIMIT: usize = 512;
    body.chars().take(LIMIT).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_chain_order() {
        let http = reqwest::Client::new();

        let all = |key: &str| match key {
            "AZURE_KEYVAULT_BEARER_TOKEN" => Some("tok".to_string()),
            "AZURE_TENANT_ID" | "AZURE_CLIENT_ID" | "AZURE_CLIENT_SECRET" => Some("x".to_string()),
            _ => None,
        };
        assert_eq!(AmbientCredential::from_lookup(http.clone(), all).kind(), "static_token");

        let sp = |key: &str| match key {
            "AZURE_TENANT_ID" | "AZURE_CLIENT_ID" | "AZURE_CLIENT_SECRET" => Some("x".to_string()),
            _ => None,
        };
        assert_eq!(AmbientCredential::from_lookup(http.clone(), sp).kind(), "client_secret");

        let partial = |key: &str| (key == "AZURE_CLIENT_ID").then(|| "x".to_string());
        assert_eq!(
            AmbientCredential::from_lookup(http, partial).kind(),
            "managed_identity"
        );
    }

    #[test]
    fn test_expiry_survives_out_of_range_lifetime() {
        let now = Instant::now();

        let huge: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "t",
            "expires_in": u64::MAX,
        }))
        .unwrap();
        assert_eq!(huge.expires_at(now), now + DEFAULT_LIFETIME);

        let imds: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "t",
            "expires_in": "3599",
        }))
        .unwrap();
        assert_eq!(imds.expires_at(now), now + Duration::from_secs(3599));
    }

    #[tokio::test]
    async fn test_client_secret_token_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = AmbientCredential::client_secret(
            reqwest::Client::new(),
            server.uri(),
            "tenant-1",
            "client",
            "secret",
        );

        assert_eq!(credential.token().await.unwrap(), "abc");
        assert_eq!(credential.token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_short_lived_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .and(header("Metadata", "true"))
            .and(query_param("resource", VAULT_RESOURCE))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "mi-token",
                "expires_in": "30"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let credential = AmbientCredential::managed_identity(
            reqwest::Client::new(),
            format!("{}/token", server.uri()),
            None,
        );

        assert_eq!(credential.token().await.unwrap(), "mi-token");
        assert_eq!(credential.token().await.unwrap(), "mi-token");
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_auth_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("AADSTS7000215"))
            .mount(&server)
            .await;

        let credential = AmbientCredential::client_secret(
            reqwest::Client::new(),
            server.uri(),
            "tenant-1",
            "client",
            "wrong",
        );

        let err = credential.token().await.unwrap_err();
        assert!(matches!(err, SecretError::Auth(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_auth_error() {
        let credential = AmbientCredential::managed_identity(
            reqwest::Client::new(),
            "http://127.0.0.1:9/token",
            None,
        );
        assert!(matches!(credential.token().await, Err(SecretError::Auth(_))));
    }
}
