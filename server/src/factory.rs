//! Application factory.
//!
//! [`create`] assembles the complete HTTP application: root liveness
//! endpoint, feature routers, JSON fallbacks and the process-wide layers.

use crate::routes;
use crate::state::AppState;
use axum::{Router, routing::get};
use posgrado_core::AppError;
use posgrado_web::{
    catch_panic_layer, cors_layer, handlers, request_id_layer, with_sessions, with_timeout,
};
use std::sync::Arc;

/// Build the router for `state`.
///
/// Layers, outermost first: request id, CORS, panic recovery, timeout,
/// signed sessions. Every route, including both fallbacks, goes through all
/// of them.
///
/// # Errors
///
/// Returns a validation error for an unusable CORS origin, or an application
/// error for an empty session secret.
pub fn create(state: AppState) -> Result<Router, AppError> {
    let settings = Arc::clone(&state.settings);

    let router = Router::new()
        .route("/", get(handlers::root))
        .merge(routes::api_router(&settings))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed);

    let router = with_sessions(router, &settings.session_secret, settings.session_https_only)?;

    let app = with_timeout(router, settings.request_timeout)
        .layer(catch_panic_layer())
        .layer(cors_layer(&settings.cors_origins)?)
        .layer(request_id_layer())
        .with_state(state);

    tracing::info!(
        project = %settings.project_name,
        global_prefix = %settings.global_prefix,
        stage_prefix = %settings.stage_prefix,
        "Application assembled"
    );
    Ok(app)
}
