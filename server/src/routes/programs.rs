//! `/programas`: graduate programs.

use super::pong;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use futures::FutureExt;
use posgrado_core::{AppError, domain::{NewProgram, Program}};
use posgrado_database::{Database, Page, repo::programs};
use posgrado_web::{ApiJson, ApiPath, ApiQuery};
use serde_json::Value;

/// Routes of this module.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/", get(list).post(create))
        .route("/:id", get(fetch))
}

#[allow(clippy::unused_async)]
async fn ping() -> Json<Value> {
    pong("programas")
}

async fn list(
    State(db): State<Database>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Vec<Program>>, AppError> {
    let rows = db
        .scoped(move |s| async move { programs::list(s, page).await }.boxed())
        .await?;
    Ok(Json(rows))
}

async fn create(
    State(db): State<Database>,
    ApiJson(new): ApiJson<NewProgram>,
) -> Result<(StatusCode, Json<Program>), AppError> {
    new.validate()?;
    let program = db
        .scoped(move |s| async move { programs::insert(s, &new).await }.boxed())
        .await?;
    Ok((StatusCode::CREATED, Json(program)))
}

async fn fetch(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Program>, AppError> {
    let program = db
        .scoped(move |s| async move { programs::get(s, id).await }.boxed())
        .await?;
    Ok(Json(program))
}
