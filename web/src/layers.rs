//! Cross-cutting layers shared by every router: CORS, signed sessions,
//! panic recovery and request timeouts.

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use posgrado_core::AppError;
use sha2::{Digest, Sha512};
use std::any::Any;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
};
use tower_sessions::{
    MemoryStore, SessionManagerLayer,
    cookie::{Key, SameSite},
};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "posgrado_session";

/// Signature of the panic handler used by [`catch_panic_layer`].
pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// CORS for an explicit origin list, with credentials.
///
/// Methods and headers mirror the preflight request. `X-Request-ID` is
/// exposed to browsers.
///
/// # Errors
///
/// Returns a validation error if an origin is not a valid header value.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, AppError> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .map_err(|e| AppError::validation(format!("Invalid CORS origin: {origin}")).with_source(e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers([HeaderName::from_static("x-request-id")]))
}

/// Derive the 64-byte cookie signing key from the configured secret.
///
/// # Errors
///
/// Returns an application error if the secret is empty.
pub fn signing_key(secret: &str) -> Result<Key, AppError> {
    if secret.is_empty() {
        return Err(AppError::application("Session secret must not be empty"));
    }

    let digest = Sha512::digest(secret.as_bytes());
    Key::try_from(digest.as_slice())
        .map_err(|e| AppError::internal("Could not derive session key").with_source(e))
}

/// Attach signed cookie sessions (in-memory store) to `router`.
///
/// The cookie is `SameSite=Lax`, `HttpOnly`, and `Secure` when `https_only`.
///
/// # Errors
///
/// Propagates [`signing_key`] failures.
pub fn with_sessions<S>(router: Router<S>, secret: &str, https_only: bool) -> Result<Router<S>, AppError>
where
    S: Clone + Send + Sync + 'static,
{
    let key = signing_key(secret)?;
    let layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_secure(https_only)
        .with_signed(key);

    Ok(router.layer(layer))
}

/// Turn handler panics into the `InternalServerError` JSON envelope.
#[must_use]
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    tracing::error!(panic = detail, "Handler panicked");
    AppError::internal("An internal error occurred").into_response()
}

/// Abort requests that run longer than `limit`.
///
/// The handler future is dropped, so an open database session rolls back,
/// and the client gets the `RequestTimeoutError` envelope with status 408.
#[must_use]
pub fn with_timeout<S>(router: Router<S>, limit: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(limit, enforce_deadline))
}

async fn enforce_deadline(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    if let Ok(response) = tokio::time::timeout(limit, next.run(request)).await {
        response
    } else {
        tracing::warn!(limit_ms = limit.as_millis(), "Request deadline exceeded");
        AppError::timeout(limit).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_signing_key_rejects_empty_secret() {
        assert!(signing_key("").is_err());
        assert!(signing_key("not-so-secret").is_ok());
    }

    #[test]
    fn test_cors_rejects_invalid_origin() {
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_ok());
        assert!(cors_layer(&["http://bad\norigin".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_cors_allows_listed_origin() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer(&["http://localhost:3000".to_string()]).unwrap());

        let request = Request::builder()
            .uri("/")
            .header("Origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers().get("access-control-allow-credentials").unwrap(),
            "true"
        );

        let request = Request::builder()
            .uri("/")
            .header("Origin", "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        #[allow(clippy::panic)]
        async fn boom() -> &'static str {
            panic!("kaboom")
        }

        let app = Router::new()
            .route("/boom", get(boom))
            .layer(catch_panic_layer());

        let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 500);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["type"], "InternalServerError");
        assert!(!String::from_utf8_lossy(&bytes).contains("kaboom"));
    }

    #[tokio::test]
    async fn test_timeout_answers_408() {
        let router: Router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    "late"
                }),
            )
            .route("/fast", get(|| async { "on time" }));
        let app = with_timeout(router, Duration::from_millis(10));

        let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 408);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(json["type"], "RequestTimeoutError");

        let request = Request::builder().uri("/fast").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
}
