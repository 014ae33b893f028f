//! Table definitions.
//!
//! Columns use only text and 64-bit integers so the same queries run on both
//! backends; timestamps are RFC 3339 text, dates ISO 8601 text. Closed value
//! sets are enforced with `CHECK (col IN (...))` built from the domain enums.

use crate::error::classify;
use crate::pool::Database;
use crate::target::Backend;
use posgrado_core::AppError;
use posgrado_core::domain::{
    AcademicDegree, DocumentType, EnrollmentStatus, ProcessStage, ProcessStatus, ProgramDegree,
    ProgramStatus, StudentStatus, TeacherStatus,
};

/// Names of the tables, in creation order.
pub const TABLES: [&str; 5] = [
    "programa",
    "estudiante",
    "programa_estudiante",
    "docente",
    "proceso_tesis",
];

struct Dialect(Backend);

impl Dialect {
    const fn id(&self) -> &'static str {
        match self.0 {
            Backend::Postgres => "BIGSERIAL PRIMARY KEY",
            Backend::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    const fn int(&self) -> &'static str {
        match self.0 {
            Backend::Postgres => "BIGINT",
            Backend::Sqlite => "INTEGER",
        }
    }

    fn digits(&self, column: &str, count: usize) -> String {
        match self.0 {
            Backend::Postgres => format!("{column} ~ '^[0-9]{{{count}}}$'"),
            Backend::Sqlite => {
                format!("length({column}) = {count} AND {column} NOT GLOB '*[^0-9]*'")
            }
        }
    }
}

fn one_of(column: &str, values: &[&str]) -> String {
    let list = values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{column} IN ({list})")
}

macro_rules! values {
    ($ty:ty) => {
        <$ty>::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>()
    };
}

/// DDL statements for `backend`, one per table.
#[must_use]
pub fn statements(backend: Backend) -> Vec<String> {
    let d = Dialect(backend);
    let (id, int) = (d.id(), d.int());

    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS programa (
                id_programa {id},
                nombre VARCHAR(50) NOT NULL,
                mencion VARCHAR(100),
                grado VARCHAR(20) NOT NULL CHECK ({}),
                estado VARCHAR(20) NOT NULL CHECK ({})
            )",
            one_of("grado", &values!(ProgramDegree)),
            one_of("estado", &values!(ProgramStatus)),
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS estudiante (
                id_estudiante {id},
                nombre VARCHAR(100) NOT NULL,
                apellido_paterno VARCHAR(100) NOT NULL,
                apellido_materno VARCHAR(100) NOT NULL,
                celular VARCHAR(15) CONSTRAINT chk_estudiante_celular CHECK ({}),
                correo_academico VARCHAR(100) UNIQUE,
                correo_personal VARCHAR(100) UNIQUE,
                documento_identidad VARCHAR(20) NOT NULL UNIQUE,
                tipo_documento VARCHAR(20) NOT NULL CHECK ({}),
                nacionalidad VARCHAR(100),
                estado VARCHAR(20) NOT NULL CHECK ({}),
                fecha_creacion VARCHAR(40) NOT NULL,
                fecha_modificacion VARCHAR(40)
            )",
            d.digits("celular", 9),
            one_of("tipo_documento", &values!(DocumentType)),
            one_of("estado", &values!(StudentStatus)),
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS programa_estudiante (
                id_programa_estudiante {id},
                id_programa {int} NOT NULL REFERENCES programa (id_programa),
                id_estudiante {int} NOT NULL REFERENCES estudiante (id_estudiante),
                codigo_alumno VARCHAR(8) NOT NULL UNIQUE CONSTRAINT chk_codigo_alumno CHECK ({}),
                malla_curricular {int},
                estado VARCHAR(20) NOT NULL CHECK ({}),
                fecha_inicio {int} NOT NULL,
                fecha_fin {int}
            )",
            d.digits("codigo_alumno", 8),
            one_of("estado", &values!(EnrollmentStatus)),
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS docente (
                id_docente {id},
                dni VARCHAR(20) NOT NULL UNIQUE CONSTRAINT chk_docente_dni CHECK ({}),
                nombres VARCHAR(100) NOT NULL,
                apellido_paterno VARCHAR(100) NOT NULL,
                apellido_materno VARCHAR(100) NOT NULL,
                correo_academico VARCHAR(100) UNIQUE,
                correo_personal VARCHAR(100) UNIQUE,
                celular VARCHAR(15) CONSTRAINT chk_docente_celular CHECK ({}),
                grado_academico VARCHAR(20) NOT NULL CHECK ({}),
                fecha_inicio_licencia VARCHAR(10),
                fecha_fin_licencia VARCHAR(10),
                estado VARCHAR(20) NOT NULL CHECK ({})
            )",
            d.digits("dni", 8),
            d.digits("celular", 9),
            one_of("grado_academico", &values!(AcademicDegree)),
            one_of("estado", &values!(TeacherStatus)),
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS proceso_tesis (
                id_proceso {id},
                id_programa_estudiante {int} NOT NULL
                    REFERENCES programa_estudiante (id_programa_estudiante),
                id_asesor {int} NOT NULL REFERENCES docente (id_docente),
                titulo_tesis_actual TEXT,
                estado_general VARCHAR(20) NOT NULL CHECK ({}),
                etapa_actual VARCHAR(30) NOT NULL CHECK ({}),
                fecha_inicio VARCHAR(40) NOT NULL,
                fecha_finalizacion VARCHAR(40)
            )",
            one_of("estado_general", &values!(ProcessStatus)),
            one_of("etapa_actual", &values!(ProcessStage)),
        ),
    ]
}

/// Create any missing table, in one session.
///
/// # Errors
///
/// Returns the classified driver error; nothing is created in that case.
pub async fn install(db: &Database) -> Result<(), AppError> {
    let mut session = db.begin().await?;
    for statement in statements(db.backend()) {
        sqlx::query(&statement)
            .execute(session.conn()?)
            .await
            .map_err(classify)?;
    }
    session.commit().await?;

    tracing::info!(backend = db.backend().as_str(), tables = TABLES.len(), "Schema installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_per_table() {
        for backend in [Backend::Postgres, Backend::Sqlite] {
            let ddl = statements(backend);
            assert_eq!(ddl.len(), TABLES.len());
            for (statement, table) in ddl.iter().zip(TABLES) {
                assert!(statement.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")));
            }
        }
    }

    #[test]
    fn test_dialect_checks() {
        let pg = statements(Backend::Postgres).join("\n");
        assert!(pg.contains("dni ~ '^[0-9]{8}$'"));
        assert!(pg.contains("BIGSERIAL PRIMARY KEY"));

        let lite = statements(Backend::Sqlite).join("\n");
        assert!(lite.contains("length(dni) = 8 AND dni NOT GLOB '*[^0-9]*'"));
        assert!(lite.contains("etapa_actual IN ('inscripcion', 'turnitin'"));
    }
}
