//! HTTP plumbing for the Posgrado backend.
//!
//! Everything here is independent of the feature routers and of the
//! application state:
//!
//! - [`middleware`]: request id resolution, per-request tracing span, latency log
//! - [`extractors`]: [`RequestId`], [`ClientIp`] and error-enveloped JSON/path/query extractors
//! - [`layers`]: CORS, signed cookie sessions, panic recovery, timeouts
//! - [`handlers`]: root liveness and the JSON not-found fallback
//!
//! # Layer Order
//!
//! ```text
//! request ─▶ RequestId ─▶ CORS ─▶ CatchPanic ─▶ Timeout ─▶ Sessions ─▶ router
//! ```
//!
//! The request id layer is outermost so that every response, including
//! panics, timeouts and CORS rejections, carries `X-Request-ID`.
//!
//! Errors reach clients as `posgrado_core::AppError`, rendered by its
//! `IntoResponse` implementation.

pub mod extractors;
pub mod handlers;
pub mod layers;
pub mod middleware;

pub use extractors::{ApiJson, ApiPath, ApiQuery, ClientIp, RequestId};
pub use layers::{catch_panic_layer, cors_layer, with_sessions, with_timeout};
pub use middleware::{REQUEST_ID_HEADER, RequestContext, RequestIdLayer, request_id_layer};
