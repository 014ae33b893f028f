//! Custom Axum extractors.
//!
//! - [`RequestId`]: the correlation id assigned by the request middleware
//! - [`ClientIp`]: client address from proxy headers or the connection
//! - [`ApiJson`], [`ApiPath`], [`ApiQuery`]: the axum extractors, rejecting
//!   malformed input with the JSON error envelope instead of plain text
//!
//! # Examples
//!
//! ```ignore
//! use posgrado_web::extractors::{ClientIp, RequestId};
//!
//! async fn handler(request_id: RequestId, client_ip: ClientIp) -> String {
//!     format!("{} from {}", request_id.0, client_ip)
//! }
//! ```

use crate::middleware::{REQUEST_ID_HEADER, RequestContext, accept_request_id};
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequest, FromRequestParts},
    http::{Extensions, HeaderMap, request::Parts},
};
use posgrado_core::AppError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use uuid::Uuid;

/// JSON body; a malformed body is a `ValidationError` (422).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters; an unparsable segment is a `ValidationError` (422).
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string; an invalid query is a `ValidationError` (422).
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Request id of the current request.
///
/// Taken from the [`RequestContext`] stored by the middleware. Without the
/// middleware it falls back to the `X-Request-ID` header, then to a fresh UUID v4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<RequestContext>() {
            return Ok(Self(context.request_id.clone()));
        }

        let id = accept_request_id(
            parts
                .headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        )
        .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self(id))
    }
}

/// Client IP address, if one could be determined.
///
/// # Priority
///
/// 1. `X-Forwarded-For` (first IP in the list)
/// 2. `X-Real-IP`
/// 3. Connection address (requires `into_make_service_with_connect_info`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl fmt::Display for ClientIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ip) => write!(f, "{ip}"),
            None => f.write_str("unknown"),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_ip(&parts.headers, &parts.extensions)))
    }
}

/// Resolve the client address from proxy headers or connection info.
#[must_use]
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
    };

    header_ip("X-Forwarded-For")
        .or_else(|| header_ip("X-Real-IP"))
        .or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_client_ip_from_forwarded_for() {
        let mut parts = parts(&[("X-Forwarded-For", "203.0.113.7, 10.0.0.1")]);
        let ip = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.0, Some("203.0.113.7".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_client_ip_from_real_ip() {
        let mut parts = parts(&[("X-Real-IP", "198.51.100.2")]);
        let ip = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.0, Some("198.51.100.2".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_client_ip_from_connect_info() {
        let mut parts = parts(&[]);
        let addr: SocketAddr = "192.0.2.10:40000".parse().unwrap();
        parts.extensions.insert(ConnectInfo(addr));

        let ip = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.0, Some(addr.ip()));
    }

    #[tokio::test]
    async fn test_client_ip_unknown() {
        let mut parts = parts(&[("X-Forwarded-For", "not-an-ip")]);
        let ip = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.to_string(), "unknown");
    }

    #[tokio::test]
    async fn test_request_id_falls_back_to_header() {
        let mut parts = parts(&[(REQUEST_ID_HEADER, "abc")]);
        let id = RequestId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id.0, "abc");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        use axum::{Router, body::Body, routing::post};
        use tower::ServiceExt;

        async fn echo(ApiJson(value): ApiJson<serde_json::Value>) -> String {
            value.to_string()
        }

        let app = Router::new().route("/", post(echo));
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 422);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["type"], "ValidationError");
    }
}
