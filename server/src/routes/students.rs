//! `/estudiantes`: students together with their program enrollments.

use super::pong;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use futures::FutureExt;
use posgrado_core::{
    AppError,
    domain::{NewStudentWithEnrollment, StudentProfile, StudentSummary, UpdateStudent},
};
use posgrado_database::{Database, Page, repo::students};
use posgrado_web::{ApiJson, ApiPath, ApiQuery};
use serde_json::Value;

/// Routes of this module.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/", get(list).post(create))
        .route("/:id", get(fetch).patch(update))
}

#[allow(clippy::unused_async)]
async fn ping() -> Json<Value> {
    pong("estudiantes")
}

/// One row per enrollment, joined with its program.
async fn list(
    State(db): State<Database>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Vec<StudentSummary>>, AppError> {
    let rows = db
        .scoped(move |s| async move { students::list(s, page).await }.boxed())
        .await?;
    Ok(Json(rows))
}

/// Student and first enrollment are written in one session: both or neither.
async fn create(
    State(db): State<Database>,
    ApiJson(new): ApiJson<NewStudentWithEnrollment>,
) -> Result<(StatusCode, Json<StudentProfile>), AppError> {
    new.validate()?;
    let profile = db
        .scoped(move |s| async move { students::insert_with_enrollment(s, &new).await }.boxed())
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn fetch(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<StudentProfile>, AppError> {
    let profile = db
        .scoped(move |s| async move { students::profile(s, id).await }.boxed())
        .await?;
    Ok(Json(profile))
}

async fn update(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<UpdateStudent>,
) -> Result<Json<StudentProfile>, AppError> {
    changes.validate()?;
    let profile = db
        .scoped(move |s| async move { students::update(s, id, &changes).await }.boxed())
        .await?;
    Ok(Json(profile))
}
