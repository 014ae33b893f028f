//! `/procesos`: thesis processes and stage transitions.

use super::pong;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use futures::FutureExt;
use posgrado_core::{
    AppError,
    domain::{NewProcess, ThesisProcess, UpdateProcess},
};
use posgrado_database::{Database, Page, repo::processes};
use posgrado_web::{ApiJson, ApiPath, ApiQuery};
use serde_json::Value;

/// Routes of this module.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/", get(list).post(create))
        .route("/:id", get(fetch).patch(update))
        .route("/:id/avanzar", post(advance))
}

#[allow(clippy::unused_async)]
async fn ping() -> Json<Value> {
    pong("procesos")
}

async fn list(
    State(db): State<Database>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Vec<ThesisProcess>>, AppError> {
    let rows = db
        .scoped(move |s| async move { processes::list(s, page).await }.boxed())
        .await?;
    Ok(Json(rows))
}

/// New processes start at `inscripcion`, status `en_proceso`.
async fn create(
    State(db): State<Database>,
    ApiJson(new): ApiJson<NewProcess>,
) -> Result<(StatusCode, Json<ThesisProcess>), AppError> {
    new.validate()?;
    let process = db
        .scoped(move |s| async move { processes::insert(s, &new).await }.boxed())
        .await?;
    Ok((StatusCode::CREATED, Json(process)))
}

async fn fetch(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ThesisProcess>, AppError> {
    let process = db
        .scoped(move |s| async move { processes::get(s, id).await }.boxed())
        .await?;
    Ok(Json(process))
}

async fn update(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<UpdateProcess>,
) -> Result<Json<ThesisProcess>, AppError> {
    changes.validate()?;
    let process = db
        .scoped(move |s| async move { processes::update(s, id, &changes).await }.boxed())
        .await?;
    Ok(Json(process))
}

/// Move the process to the next stage. Paused, closed or finished
/// processes are rejected with 400.
async fn advance(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ThesisProcess>, AppError> {
    let process = db
        .scoped(move |s| async move { processes::advance(s, id).await }.boxed())
        .await?;
    Ok(Json(process))
}
