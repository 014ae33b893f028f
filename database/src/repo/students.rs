//! `estudiante` and `programa_estudiante` tables.

use super::{Page, int, opt_int, opt_text, opt_timestamp, parsed, text, timestamp, ts};
use crate::error::classify;
use crate::session::Session;
use chrono::Utc;
use posgrado_core::AppError;
use posgrado_core::domain::{
    DocumentType, Enrollment, EnrollmentStatus, NewStudentWithEnrollment, ProgramDegree, Student,
    StudentProfile, StudentStatus, StudentSummary, UpdateStudent,
};
use sqlx::any::AnyRow;

const STUDENT_COLUMNS: &str = "id_estudiante, nombre, apellido_paterno, apellido_materno, \
    celular, correo_academico, correo_personal, documento_identidad, tipo_documento, \
    nacionalidad, estado, fecha_creacion, fecha_modificacion";

const ENROLLMENT_COLUMNS: &str = "id_programa_estudiante, id_programa, id_estudiante, \
    codigo_alumno, malla_curricular, estado, fecha_inicio, fecha_fin";

fn student_from_row(row: &AnyRow) -> Result<Student, AppError> {
    Ok(Student {
        id: int(row, "id_estudiante")?,
        name: text(row, "nombre")?,
        paternal_surname: text(row, "apellido_paterno")?,
        maternal_surname: text(row, "apellido_materno")?,
        phone: opt_text(row, "celular")?,
        academic_email: opt_text(row, "correo_academico")?,
        personal_email: opt_text(row, "correo_personal")?,
        identity_document: text(row, "documento_identidad")?,
        document_type: parsed(row, "tipo_documento", DocumentType::parse)?,
        nationality: opt_text(row, "nacionalidad")?,
        status: parsed(row, "estado", StudentStatus::parse)?,
        created_at: timestamp(row, "fecha_creacion")?,
        updated_at: opt_timestamp(row, "fecha_modificacion")?,
    })
}

fn enrollment_from_row(row: &AnyRow) -> Result<Enrollment, AppError> {
    Ok(Enrollment {
        id: int(row, "id_programa_estudiante")?,
        program_id: int(row, "id_programa")?,
        student_id: int(row, "id_estudiante")?,
        code: text(row, "codigo_alumno")?,
        curriculum: opt_int(row, "malla_curricular")?,
        status: parsed(row, "estado", EnrollmentStatus::parse)?,
        admission_year: int(row, "fecha_inicio")?,
        graduation_year: opt_int(row, "fecha_fin")?,
    })
}

fn summary_from_row(row: &AnyRow) -> Result<StudentSummary, AppError> {
    Ok(StudentSummary {
        id: int(row, "id_estudiante")?,
        enrollment_id: int(row, "id_programa_estudiante")?,
        code: text(row, "codigo_alumno")?,
        document_type: parsed(row, "tipo_documento", DocumentType::parse)?,
        identity_document: text(row, "documento_identidad")?,
        name: text(row, "nombre")?,
        paternal_surname: text(row, "apellido_paterno")?,
        maternal_surname: text(row, "apellido_materno")?,
        program_name: text(row, "programa")?,
        degree: parsed(row, "grado", ProgramDegree::parse)?,
        mention: opt_text(row, "mencion")?,
        status: parsed(row, "estado", EnrollmentStatus::parse)?,
    })
}

/// Insert a student and their first enrollment.
///
/// Both rows are written on the same session, so they commit or roll back
/// together.
///
/// # Errors
///
/// Returns `DatabaseIntegrity` for a duplicate document, e-mail or code or
/// an unknown program, or another classified driver error. `new` must
/// already be validated.
pub async fn insert_with_enrollment(
    session: &mut Session,
    new: &NewStudentWithEnrollment,
) -> Result<StudentProfile, AppError> {
    let person = &new.person;
    let academic = &new.academic;

    let row = sqlx::query(&format!(
        "INSERT INTO estudiante (nombre, apellido_paterno, apellido_materno, celular,
             correo_academico, correo_personal, documento_identidad, tipo_documento,
             nacionalidad, estado, fecha_creacion)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {STUDENT_COLUMNS}"
    ))
    .bind(person.name.as_str())
    .bind(person.paternal_surname.as_str())
    .bind(person.maternal_surname.as_str())
    .bind(person.phone.clone())
    .bind(person.academic_email.clone())
    .bind(person.personal_email.clone())
    .bind(person.identity_document.as_str())
    .bind(person.document_type.as_str())
    .bind(person.nationality.clone())
    .bind(person.status.as_str())
    .bind(ts(Utc::now()))
    .fetch_one(session.conn()?)
    .await
    .map_err(classify)?;
    let student = student_from_row(&row)?;

    let row = sqlx::query(&format!(
        "INSERT INTO programa_estudiante (id_programa, id_estudiante, codigo_alumno,
             malla_curricular, estado, fecha_inicio, fecha_fin)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {ENROLLMENT_COLUMNS}"
    ))
    .bind(academic.program_id)
    .bind(student.id)
    .bind(academic.code.as_str())
    .bind(academic.curriculum)
    .bind(academic.status.as_str())
    .bind(academic.admission_year)
    .bind(academic.graduation_year)
    .fetch_one(session.conn()?)
    .await
    .map_err(classify)?;
    let enrollment = enrollment_from_row(&row)?;

    tracing::info!(
        student_id = student.id,
        enrollment_id = enrollment.id,
        "Student enrolled"
    );

    Ok(StudentProfile {
        personal: student,
        academic: vec![enrollment],
    })
}

/// Fetch a student by id.
///
/// # Errors
///
/// Returns `NotFound` if absent, or the classified driver error.
pub async fn get(session: &mut Session, id: i64) -> Result<Student, AppError> {
    sqlx::query(&format!(
        "SELECT {STUDENT_COLUMNS} FROM estudiante WHERE id_estudiante = $1"
    ))
    .bind(id)
    .fetch_optional(session.conn()?)
    .await
    .map_err(classify)?
    .as_ref()
    .map(student_from_row)
    .transpose()?
    .ok_or_else(|| AppError::not_found("Student", id))
}

/// Enrollments of a student, oldest first.
///
/// # Errors
///
/// Returns the classified driver error.
pub async fn enrollments(session: &mut Session, student_id: i64) -> Result<Vec<Enrollment>, AppError> {
    sqlx::query(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM programa_estudiante
         WHERE id_estudiante = $1 ORDER BY id_programa_estudiante"
    ))
    .bind(student_id)
    .fetch_all(session.conn()?)
    .await
    .map_err(classify)?
    .iter()
    .map(enrollment_from_row)
    .collect()
}

/// Fetch a student with all enrollments.
///
/// # Errors
///
/// Returns `NotFound` if absent, or the classified driver error.
pub async fn profile(session: &mut Session, id: i64) -> Result<StudentProfile, AppError> {
    let personal = get(session, id).await?;
    let academic = enrollments(session, id).await?;
    Ok(StudentProfile { personal, academic })
}

/// One row per enrollment, joined with the student and program.
///
/// # Errors
///
/// Returns the classified driver error.
pub async fn list(session: &mut Session, page: Page) -> Result<Vec<StudentSummary>, AppError> {
    sqlx::query(
        "SELECT e.id_estudiante, pe.id_programa_estudiante, pe.codigo_alumno,
                e.tipo_documento, e.documento_identidad, e.nombre,
                e.apellido_paterno, e.apellido_materno,
                p.nombre AS programa, p.grado, p.mencion, pe.estado
         FROM programa_estudiante pe
         JOIN estudiante e ON e.id_estudiante = pe.id_estudiante
         JOIN programa p ON p.id_programa = pe.id_programa
         ORDER BY pe.codigo_alumno
         LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(session.conn()?)
    .await
    .map_err(classify)?
    .iter()
    .map(summary_from_row)
    .collect()
}

/// Apply a partial update to the student and, when academic fields are set,
/// to one enrollment (`enrollment_id`, or the most recent one).
///
/// # Errors
///
/// Returns `NotFound` for an unknown student or enrollment, a validation
/// error, or the classified driver error.
pub async fn update(
    session: &mut Session,
    id: i64,
    update: &UpdateStudent,
) -> Result<StudentProfile, AppError> {
    let mut student = get(session, id).await?;
    student.apply(update, Utc::now())?;

    sqlx::query(
        "UPDATE estudiante
         SET celular = $1, correo_personal = $2, correo_academico = $3, nacionalidad = $4,
             tipo_documento = $5, documento_identidad = $6, estado = $7,
             fecha_modificacion = $8
         WHERE id_estudiante = $9",
    )
    .bind(student.phone.clone())
    .bind(student.personal_email.clone())
    .bind(student.academic_email.clone())
    .bind(student.nationality.clone())
    .bind(student.document_type.as_str())
    .bind(student.identity_document.clone())
    .bind(student.status.as_str())
    .bind(student.updated_at.map(ts))
    .bind(id)
    .execute(session.conn()?)
    .await
    .map_err(classify)?;

    let mut academic = enrollments(session, id).await?;

    if update.touches_enrollment() {
        let target = match update.enrollment_id {
            Some(enrollment_id) => academic
                .iter_mut()
                .find(|e| e.id == enrollment_id)
                .ok_or_else(|| AppError::not_found("Enrollment", enrollment_id))?,
            None => academic
                .last_mut()
                .ok_or_else(|| AppError::not_found("Enrollment of student", id))?,
        };
        target.apply(update)?;

        sqlx::query(
            "UPDATE programa_estudiante
             SET malla_curricular = $1, fecha_fin = $2, estado = $3
             WHERE id_programa_estudiante = $4",
        )
        .bind(target.curriculum)
        .bind(target.graduation_year)
        .bind(target.status.as_str())
        .bind(target.id)
        .execute(session.conn()?)
        .await
        .map_err(classify)?;
    }

    tracing::info!(student_id = id, "Student updated");
    Ok(StudentProfile {
        personal: student,
        academic,
    })
}
