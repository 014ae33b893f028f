//! Classification of driver errors into the application taxonomy.

use posgrado_core::AppError;
use sqlx::error::ErrorKind as DbErrorKind;

/// Client message for constraint violations.
pub const INTEGRITY_MESSAGE: &str = "Integrity violation in the database.";
/// Client message for connectivity failures.
pub const CONNECTION_MESSAGE: &str = "Database connection error.";
/// Client message for other execution failures.
pub const QUERY_MESSAGE: &str = "Error executing the database query.";
/// Client message for an unusable connection configuration.
pub const CONFIGURATION_MESSAGE: &str = "Database configuration error.";

/// Map a driver error to an [`AppError`].
///
/// - constraint violations (unique, foreign key, not null, check) → `DatabaseIntegrity`
/// - I/O, TLS, pool exhaustion or shutdown, worker crash, protocol → `DatabaseConnection`
/// - anything else → `DatabaseQuery`
///
/// The driver error is attached as the source and never shown to clients.
#[must_use]
pub fn classify(err: sqlx::Error) -> AppError {
    let app = match &err {
        sqlx::Error::Database(db) => match db.kind() {
            DbErrorKind::UniqueViolation
            | DbErrorKind::ForeignKeyViolation
            | DbErrorKind::NotNullViolation
            | DbErrorKind::CheckViolation => AppError::database_integrity(INTEGRITY_MESSAGE),
            _ => AppError::database_query(QUERY_MESSAGE),
        },
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Protocol(_) => AppError::database_connection(CONNECTION_MESSAGE),
        sqlx::Error::Configuration(_) => AppError::database_connection(CONFIGURATION_MESSAGE),
        _ => AppError::database_query(QUERY_MESSAGE),
    };
    app.with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posgrado_core::ErrorKind;

    #[test]
    fn test_connection_failures() {
        for err in [
            sqlx::Error::PoolTimedOut,
            sqlx::Error::PoolClosed,
            sqlx::Error::WorkerCrashed,
            sqlx::Error::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
            sqlx::Error::Protocol("unexpected message".to_string()),
        ] {
            let app = classify(err);
            assert_eq!(app.kind(), ErrorKind::DatabaseConnection);
            assert_eq!(app.status().as_u16(), 503);
        }
    }

    #[test]
    fn test_other_failures_are_query_errors() {
        let app = classify(sqlx::Error::RowNotFound);
        assert_eq!(app.kind(), ErrorKind::DatabaseQuery);
        assert_eq!(app.message(), QUERY_MESSAGE);
        assert!(app.cause().is_some());
    }
}
