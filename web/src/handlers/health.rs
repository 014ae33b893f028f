//! Liveness endpoint and the JSON fallbacks for unknown routes and methods.

use axum::{
    Json,
    http::{Method, Uri},
};
use posgrado_core::{AppError, ErrorKind};
use serde::Serialize;

/// Message returned by the root liveness endpoint.
pub const ALIVE_MESSAGE: &str = "API de Posgrado activa.";

/// Body of the liveness endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Alive {
    /// Always `true`.
    pub ok: bool,
    /// Fixed message.
    pub msg: &'static str,
}

/// Liveness check. Does not touch dependencies.
///
/// ```text
/// GET /
/// {"ok": true, "msg": "API de Posgrado activa."}
/// ```
#[allow(clippy::unused_async)]
pub async fn root() -> Json<Alive> {
    Json(Alive {
        ok: true,
        msg: ALIVE_MESSAGE,
    })
}

/// Fallback for routes that do not exist, in the standard error envelope.
#[allow(clippy::unused_async)]
pub async fn not_found(uri: Uri) -> AppError {
    AppError::new(
        ErrorKind::NotFound,
        format!("Route {} not found", uri.path()),
    )
}

/// Fallback for a known path called with a method it does not accept.
#[allow(clippy::unused_async)]
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::new(
        ErrorKind::MethodNotAllowed,
        format!("Method {method} not allowed on {}", uri.path()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(root))
            .fallback(not_found)
            .method_not_allowed_fallback(method_not_allowed)
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"ok": true, "msg": ALIVE_MESSAGE}));
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_envelope() {
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(json["type"], "NotFoundError");
    }

    #[tokio::test]
    async fn test_wrong_method_uses_error_envelope() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 405);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(json["type"], "MethodNotAllowedError");
        assert_eq!(json["message"], "Method DELETE not allowed on /");
    }
}
