//! Request tracking middleware.
//!
//! [`RequestIdLayer`] wraps every request:
//!
//! 1. **Resolve** the request id from the `X-Request-ID` header, or generate a UUID v4
//!    when the header is missing, blank or a placeholder
//! 2. **Store** a [`RequestContext`] in the request extensions
//! 3. **Open** an `http_request` span carrying request id, method, path and client address,
//!    so every log line of the request is tagged with them
//! 4. **Log** the final status and elapsed milliseconds
//! 5. **Echo** the request id in the response `X-Request-ID` header
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use posgrado_web::middleware::request_id_layer;
//!
//! let app = Router::new()
//!     .route("/", get(root))
//!     .layer(request_id_layer());
//! ```

use crate::extractors::client_ip;
use axum::{extract::Request, http::HeaderValue, response::Response};
use chrono::{DateTime, Utc};
use http::Method;
use std::net::IpAddr;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Longest inbound request id that is accepted as-is.
pub const MAX_REQUEST_ID_LEN: usize = 128;

const PLACEHOLDERS: [&str; 4] = ["desconocido", "unknown", "null", "undefined"];

/// Per-request facts, available to handlers through the request extensions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id, inbound or generated.
    pub request_id: String,
    /// HTTP method.
    pub method: Method,
    /// Request path, without the query string.
    pub path: String,
    /// Client address, when known.
    pub client_ip: Option<IpAddr>,
    /// Time the request entered the middleware.
    pub started_at: DateTime<Utc>,
}

/// Use `candidate` as request id if it is a usable, non-placeholder value.
#[must_use]
pub fn accept_request_id(candidate: Option<&str>) -> Option<String> {
    let value = candidate?.trim();
    let usable = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && !PLACEHOLDERS.iter().any(|p| value.eq_ignore_ascii_case(p));
    usable.then(|| value.to_string())
}

/// Create the request tracking layer.
#[must_use]
pub const fn request_id_layer() -> RequestIdLayer {
    RequestIdLayer
}

/// Layer for request id tracking.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdMiddleware { inner }
    }
}

/// Middleware service for request id tracking.
#[derive(Clone, Debug)]
pub struct RequestIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for RequestIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let request_id = accept_request_id(
            req.headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        )
        .unwrap_or_else(|| Uuid::new_v4().to_string());

        let context = RequestContext {
            request_id: request_id.clone(),
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            client_ip: client_ip(req.headers(), req.extensions()),
            started_at: Utc::now(),
        };

        let span = tracing::info_span!(
            "http_request",
            request_id = %context.request_id,
            method = %context.method,
            path = %context.path,
            client_ip = %context
                .client_ip
                .map_or_else(|| "unknown".to_string(), |ip| ip.to_string()),
        );

        req.extensions_mut().insert(context);
        let started = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let mut response = fut.await?;

                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                let status = response.status().as_u16();
                tracing::info!(status, elapsed_ms, "Request completed");
                metrics::counter!("http.requests", "status" => status.to_string()).increment(1);
                #[allow(clippy::cast_precision_loss)]
                metrics::histogram!("http.request.duration_ms").record(elapsed_ms as f64);

                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Access to the [`RequestContext`] stored by the middleware.
pub trait RequestContextExt {
    /// The context, if the middleware ran.
    fn request_context(&self) -> Option<&RequestContext>;
}

impl RequestContextExt for Request {
    fn request_context(&self) -> Option<&RequestContext> {
        self.extensions().get::<RequestContext>()
    }
}
