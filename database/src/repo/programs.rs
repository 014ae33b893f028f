//! `programa` table.

use super::{Page, int, opt_text, parsed, text};
use crate::error::classify;
use crate::session::Session;
use posgrado_core::AppError;
use posgrado_core::domain::{NewProgram, Program, ProgramDegree, ProgramStatus};
use sqlx::any::AnyRow;

const COLUMNS: &str = "id_programa, nombre, mencion, grado, estado";

fn from_row(row: &AnyRow) -> Result<Program, AppError> {
    Ok(Program {
        id: int(row, "id_programa")?,
        name: text(row, "nombre")?,
        mention: opt_text(row, "mencion")?,
        degree: parsed(row, "grado", ProgramDegree::parse)?,
        status: parsed(row, "estado", ProgramStatus::parse)?,
    })
}

/// Insert a validated program.
///
/// # Errors
///
/// Returns the classified driver error.
pub async fn insert(session: &mut Session, new: &NewProgram) -> Result<Program, AppError> {

    let row = sqlx::query(&format!(
        "INSERT INTO programa (nombre, mencion, grado, estado)
         VALUES ($1, $2, $3, $4)
         RETURNING {COLUMNS}"
    ))
    .bind(new.name.as_str())
    .bind(new.mention.clone())
    .bind(new.degree.as_str())
    .bind(new.status.as_str())
    .fetch_one(session.conn()?)
    .await
    .map_err(classify)?;

    let program = from_row(&row)?;
    tracing::info!(program_id = program.id, "Program created");
    Ok(program)
}

/// Fetch a program by id.
///
/// # Errors
///
/// Returns `NotFound` if absent, or the classified driver error.
pub async fn get(session: &mut Session, id: i64) -> Result<Program, AppError> {
    sqlx::query(&format!("SELECT {COLUMNS} FROM programa WHERE id_programa = $1"))
        .bind(id)
        .fetch_optional(session.conn()?)
        .await
        .map_err(classify)?
        .as_ref()
        .map(from_row)
        .transpose()?
        .ok_or_else(|| AppError::not_found("Program", id))
}

/// List programs ordered by id.
///
/// # Errors
///
/// Returns the classified driver error.
pub async fn list(session: &mut Session, page: Page) -> Result<Vec<Program>, AppError> {
    sqlx::query(&format!(
        "SELECT {COLUMNS} FROM programa ORDER BY id_programa LIMIT $1 OFFSET $2"
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
