//! `proceso_tesis` table.

use super::{Page, int, opt_text, opt_timestamp, parsed, timestamp, ts};
use crate::error::classify;
use crate::session::Session;
use chrono::Utc;
use posgrado_core::AppError;
use posgrado_core::domain::{
    NewProcess, ProcessStage, ProcessStatus, ThesisProcess, UpdateProcess,
};
use sqlx::any::AnyRow;

const COLUMNS: &str = "id_proceso, id_programa_estudiante, id_asesor, titulo_tesis_actual, \
    estado_general, etapa_actual, fecha_inicio, fecha_finalizacion";

fn from_row(row: &AnyRow) -> Result<ThesisProcess, AppError> {
    Ok(ThesisProcess {
        id: int(row, "id_proceso")?,
        enrollment_id: int(row, "id_programa_estudiante")?,
        advisor_id: int(row, "id_asesor")?,
        thesis_title: opt_text(row, "titulo_tesis_actual")?,
        general_status: parsed(row, "estado_general", ProcessStatus::parse)?,
        current_stage: parsed(row, "etapa_actual", ProcessStage::parse)?,
        start_date: timestamp(row, "fecha_inicio")?,
        end_date: opt_timestamp(row, "fecha_finalizacion")?,
    })
}

/// Open a process at the first stage. `new` must already be validated.
///
/// # Errors
///
/// Returns `DatabaseIntegrity` for an unknown enrollment or advisor, or
/// another classified driver error.
pub async fn insert(session: &mut Session, new: &NewProcess) -> Result<ThesisProcess, AppError> {

    let row = sqlx::query(&format!(
        "INSERT INTO proceso_tesis (id_programa_estudiante, id_asesor, titulo_tesis_actual,
             estado_general, etapa_actual, fecha_inicio)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    ))
    .bind(new.enrollment_id)
    .bind(new.advisor_id)
    .bind(new.thesis_title.trim())
    .bind(ProcessStatus::default().as_str())
    .bind(ProcessStage::default().as_str())
    .bind(ts(Utc::now()))
    .fetch_one(session.conn()?)
    .await
    .map_err(classify)?;

    let process = from_row(&row)?;
    tracing::info!(process_id = process.id, "Thesis process opened");
    Ok(process)
}

/// Fetch a process by id.
///
/// # Errors
///
/// Returns `NotFound` if absent, or the classified driver error.
pub async fn get(session: &mut Session, id: i64) -> Result<ThesisProcess, AppError> {
    sqlx::query(&format!("SELECT {COLUMNS} FROM proceso_tesis WHERE id_proceso = $1"))
        .bind(id)
        .fetch_optional(session.conn()?)
        .await
        .map_err(classify)?
        .as_ref()
        .map(from_row)
        .transpose()?
        .ok_or_else(|| AppError::not_found("Process", id))
}

/// List processes, newest first.
///
/// # Errors
///
/// Returns the classified driver error.
pub async fn list(session: &mut Session, page: Page) -> Result<Vec<ThesisProcess>, AppError> {
    sqlx::query(&format!(
        "SELECT {COLUMNS} FROM proceso_tesis ORDER BY id_proceso DESC LIMIT $1 OFFSET $2"
    ))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(session.conn()?)
    .await
    .map_err(classify)?
    .iter()
    .map(from_row)
    .collect()
}

/// Processes currently at `stage`, oldest first.
///
/// # Errors
///
/// Returns the classified driver error.
pub async fn list_in_stage(
    session: &mut Session,
    stage: ProcessStage,
    page: Page,
) -> Result<Vec<ThesisProcess>, AppError> {
    sqlx::query(&format!(
        "SELECT {COLUMNS} FROM proceso_tesis
         WHERE etapa_actual = $1
         ORDER BY id_proceso LIMIT $2 OFFSET $3"
    ))
    .bind(stage.as_str())
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(session.conn()?)
    .await
    .map_err(classify)?
    .iter()
    .map(from_row)
    .collect()
}

async fn save(session: &mut Session, process: &ThesisProcess) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE proceso_tesis
         SET titulo_tesis_actual = $1, estado_general = $2, etapa_actual = $3,
             fecha_finalizacion = $4
         WHERE id_proceso = $5",
    )
    .bind(process.thesis_title.clone())
    .bind(process.general_status.as_str())
    .bind(process.current_stage.as_str())
    .bind(process.end_date.map(ts))
    .bind(process.id)
    .execute(session.conn()?)
    .await
    .map_err(classify)?;
    Ok(())
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns `NotFound`, a validation error, or the classified driver error.
pub async fn update(
    session: &mut Session,
    id: i64,
    update: &UpdateProcess,
) -> Result<ThesisProcess, AppError> {
    let mut process = get(session, id).await?;
    process.apply(update, Utc::now())?;
    save(session, &process).await?;

    tracing::info!(process_id = id, stage = %process.current_stage, "Thesis process updated");
    Ok(process)
}

/// Move a process to its next stage.
///
/// # Errors
///
/// Returns `NotFound`, an application error if the process cannot advance,
/// or the classified driver error.
pub async fn advance(session: &mut Session, id: i64) -> Result<ThesisProcess, AppError> {
    let mut process = get(session, id).await?;
    let from = process.current_stage;
    let to = process.advance(Utc::now())?;
    save(session, &process).await?;

    tracing::info!(process_id = id, from = %from, to = %to, "Thesis process advanced");
    metrics::counter!("processes.advanced", "stage" => to.as_str()).increment(1);
    Ok(process)
}
