//! Readiness probe.

use axum::{Json, extract::State};
use posgrado_core::AppError;
use posgrado_database::Database;
use serde_json::{Value, json};

/// `GET /health/ready`: 200 once the database answers a ping.
///
/// # Errors
///
/// Returns the classified database error, typically `DatabaseConnection` (503).
pub async fn ready(State(db): State<Database>) -> Result<Json<Value>, AppError> {
    db.ping().await?;
    Ok(Json(json!({ "ready": true })))
}
