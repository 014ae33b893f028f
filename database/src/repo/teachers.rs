//! `docente` table.

use super::{Page, date, int, opt_date, opt_text, parsed, text};
use crate::error::classify;
use crate::session::Session;
use posgrado_core::AppError;
use posgrado_core::domain::{AcademicDegree, NewTeacher, Teacher, TeacherStatus, UpdateTeacher};
use sqlx::any::AnyRow;

const COLUMNS: &str = "id_docente, dni, nombres, apellido_paterno, apellido_materno, \
    correo_academico, correo_personal, celular, grado_academico, \
    fecha_inicio_licencia, fecha_fin_licencia, estado";

fn from_row(row: &AnyRow) -> Result<Teacher, AppError> {
    Ok(Teacher {
        id: int(row, "id_docente")?,
        dni: text(row, "dni")?,
        name: text(row, "nombres")?,
        paternal_surname: text(row, "apellido_paterno")?,
        maternal_surname: text(row, "apellido_materno")?,
        academic_email: opt_text(row, "correo_academico")?,
        personal_email: opt_text(row, "correo_personal")?,
        phone: opt_text(row, "celular")?,
        academic_degree: parsed(row, "grado_academico", AcademicDegree::parse)?,
        license_start_date: opt_date(row, "fecha_inicio_licencia")?,
        license_end_date: opt_date(row, "fecha_fin_licencia")?,
        status: parsed(row, "estado", TeacherStatus::parse)?,
    })
}

/// Register a teacher.
///
/// # Errors
///
/// Returns `DatabaseIntegrity` for a duplicate dni or e-mail, or another
/// classified driver error. `new` must already be validated.
pub async fn insert(session: &mut Session, new: &NewTeacher) -> Result<Teacher, AppError> {

    let row = sqlx::query(&format!(
        "INSERT INTO docente (dni, nombres, apellido_paterno, apellido_materno,
             correo_academico, correo_personal, celular, grado_academico, estado)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {COLUMNS}"
    ))
    .bind(new.dni.as_str())
    .bind(new.name.as_str())
    .bind(new.paternal_surname.as_str())
    .bind(new.maternal_surname.as_str())
    .bind(new.academic_email.clone())
    .bind(new.personal_email.clone())
    .bind(new.phone.clone())
    .bind(new.academic_degree.as_str())
    .bind(new.status.as_str())
    .fetch_one(session.conn()?)
    .await
    .map_err(classify)?;

    let teacher = from_row(&row)?;
    tracing::info!(teacher_id = teacher.id, "Teacher registered");
    Ok(teacher)
}

/// Fetch a teacher by id.
///
/// # Errors
///
/// Returns `NotFound` if absent, or the classified driver error.
pub async fn get(session: &mut Session, id: i64) -> Result<Teacher, AppError> {
    sqlx::query(&format!("SELECT {COLUMNS} FROM docente WHERE id_docente = $1"))
        .bind(id)
        .fetch_optional(session.conn()?)
        .await
        .map_err(classify)?
        .as_ref()
        .map(from_row)
        .transpose()?
        .ok_or_else(|| AppError::not_found("Teacher", id))
}

/// List teachers by surname.
///
/// # Errors
///
/// Returns the classified driver error.
pub async fn list(session: &mut Session, page: Page) -> Result<Vec<Teacher>, AppError> {
    sqlx::query(&format!(
        "SELECT {COLUMNS} FROM docente
         ORDER BY apellido_paterno, apellido_materno, id_docente
         LIMIT $1 OFFSET $2"
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

/// Apply a partial update and return the stored result.
///
/// # Errors
///
/// Returns `NotFound`, a validation error, or the classified driver error.
pub async fn update(
    session: &mut Session,
    id: i64,
    update: &UpdateTeacher,
) -> Result<Teacher, AppError> {
    let mut teacher = get(session, id).await?;
    teacher.apply(update)?;

    sqlx::query(
        "UPDATE docente
         SET correo_academico = $1, correo_personal = $2, celular = $3, estado = $4,
             fecha_inicio_licencia = $5, fecha_fin_licencia = $6, grado_academico = $7
         WHERE id_docente = $8",
    )
    .bind(teacher.academic_email.clone())
    .bind(teacher.personal_email.clone())
    .bind(teacher.phone.clone())
    .bind(teacher.status.as_str())
    .bind(teacher.license_start_date.map(date))
    .bind(teacher.license_end_date.map(date))
    .bind(teacher.academic_degree.as_str())
    .bind(id)
    .execute(session.conn()?)
    .await
    .map_err(classify)?;

    tracing::info!(teacher_id = id, "Teacher updated");
    Ok(teacher)
}
