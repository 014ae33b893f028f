//! Conversion of [`AppError`] into HTTP responses.
//!
//! This is the single place where an error kind becomes a status code and a
//! JSON body, and where application errors are logged. Request context
//! (request id, method, path, client address) comes from the enclosing
//! `http_request` span opened by the request middleware.

use crate::error::{AppError, Severity};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind().type_name();
        let cause = self.cause().map(|source| format!("{source:#}"));

        match Severity::from_status(status) {
            Severity::Critical => tracing::error!(
                status = status.as_u16(),
                error_type = kind,
                message = %self.message(),
                cause = cause.as_deref().unwrap_or("-"),
                "Request failed with server error"
            ),
            Severity::Client => tracing::warn!(
                status = status.as_u16(),
                error_type = kind,
                message = %self.message(),
                "Request failed with client error"
            ),
            Severity::Info => tracing::info!(
                status = status.as_u16(),
                error_type = kind,
                message = %self.message(),
                "Request finished with application error"
            ),
        }

        (status, Json(self.body())).into_response()
    }
}

// Extractor rejections become validation errors so malformed input is
// answered with the same envelope as every other failure.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_integrity_error_response() {
        let response = AppError::database_integrity("Integrity violation in the database.")
            .with_source(anyhow::anyhow!("UNIQUE constraint failed: docente.dni"))
            .into_response();

        assert_eq!(response.status().as_u16(), 409);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(json["type"], "DatabaseIntegrityError");
        assert_eq!(json["message"], "Integrity violation in the database.");
        assert!(!String::from_utf8_lossy(&bytes).contains("UNIQUE"));
    }

    #[tokio::test]
    async fn test_internal_error_response() {
        let err: AppError = anyhow::anyhow!("connection reset by peer").into();
        let response = err.into_response();

        assert_eq!(response.status().as_u16(), 500);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!String::from_utf8_lossy(&bytes).contains("connection reset"));
    }
}
