//! Feature routers.
//!
//! Every handler runs its database work inside
//! [`Database::scoped`](posgrado_database::Database::scoped), so a request
//! either commits once or leaves no trace.

pub mod health;
pub mod processes;
pub mod programs;
pub mod stages;
pub mod students;
pub mod teachers;

use crate::settings::Settings;
use crate::state::AppState;
use axum::{Json, Router, routing::get};
use posgrado_core::domain::ProcessStage;
use serde_json::{Value, json};

/// Every feature router, mounted under the configured prefixes.
///
/// ```text
/// {GLOBAL_PREFIX}/estudiantes   students and their enrollments
/// {GLOBAL_PREFIX}/docentes      teachers
/// {GLOBAL_PREFIX}/programas     graduate programs
/// {GLOBAL_PREFIX}/procesos      thesis processes
/// {STAGE_PREFIX}/{stage}        one router per process stage
/// /health/ready                 readiness (database ping)
/// ```
pub fn api_router(settings: &Settings) -> Router<AppState> {
    let global = settings.global_prefix.trim_end_matches('/');
    let stage_root = settings.stage_prefix.trim_end_matches('/');

    let router = Router::new()
        .route("/health/ready", get(health::ready))
        .nest(&format!("{global}/estudiantes"), students::router())
        .nest(&format!("{global}/docentes"), teachers::router())
        .nest(&format!("{global}/programas"), programs::router())
        .nest(&format!("{global}/procesos"), processes::router());

    ProcessStage::ALL.iter().fold(router, |router, stage| {
        router.nest(&format!("{stage_root}/{}", stage.slug()), stages::router(*stage))
    })
}

/// Body of every router's `/ping`.
pub(crate) fn pong(module: &str) -> Json<Value> {
    Json(json!({ "status": "ok", "module": module }))
}
