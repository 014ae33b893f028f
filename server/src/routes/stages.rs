//! `{STAGE_PREFIX}/{stage}`: one router per process stage.

use super::pong;
use crate::state::AppState;
use axum::{Json, Router, extract::State, routing::get};
use futures::FutureExt;
use posgrado_core::{
    AppError,
    domain::{ProcessStage, ThesisProcess},
};
use posgrado_database::{Database, Page, repo::processes};
use posgrado_web::ApiQuery;

/// Routes for `stage`: `/ping` and `/procesos` (processes currently in it).
pub fn router(stage: ProcessStage) -> Router<AppState> {
    Router::new()
        .route("/ping", get(move || async move { pong(stage.slug()) }))
        .route(
            "/procesos",
            get(move |db: State<Database>, page: ApiQuery<Page>| in_stage(stage, db, page)),
        )
}

async fn in_stage(
    stage: ProcessStage,
    State(db): State<Database>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Vec<ThesisProcess>>, AppError> {
    let rows = db
        .scoped(move |s| async move { processes::list_in_stage(s, stage, page).await }.boxed())
        .await?;
    Ok(Json(rows))
}
