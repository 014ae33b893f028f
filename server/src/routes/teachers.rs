//! `/docentes`: teachers and advisors.

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
    domain::{NewTeacher, Teacher, UpdateTeacher},
};
use posgrado_database::{Database, Page, repo::teachers};
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
    pong("docentes")
}

async fn list(
    State(db): State<Database>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Vec<Teacher>>, AppError> {
    let rows = db
        .scoped(move |s| async move { teachers::list(s, page).await }.boxed())
        .await?;
    Ok(Json(rows))
}

/// A duplicate dni or e-mail is answered with 409 `DatabaseIntegrityError`.
async fn create(
    State(db): State<Database>,
    ApiJson(new): ApiJson<NewTeacher>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    new.validate()?;
    let teacher = db
        .scoped(move |s| async move { teachers::insert(s, &new).await }.boxed())
        .await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

async fn fetch(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = db
        .scoped(move |s| async move { teachers::get(s, id).await }.boxed())
        .await?;
    Ok(Json(teacher))
}

async fn update(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<UpdateTeacher>,
) -> Result<Json<Teacher>, AppError> {
    changes.validate()?;
    let teacher = db
        .scoped(move |s| async move { teachers::update(s, id, &changes).await }.boxed())
        .await?;
    Ok(Json(teacher))
}
