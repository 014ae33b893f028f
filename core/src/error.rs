//! Application error taxonomy.
//!
//! Every failure that can reach a client is an [`AppError`] tagged with exactly
//! one [`ErrorKind`]. The kind decides the HTTP status and the `type` reported
//! in the JSON envelope; the message is user-facing; the optional source is kept
//! for server-side diagnostics only.
//!
//! # Example
//!
//! ```
//! use posgrado_core::{AppError, ErrorKind};
//!
//! let err = AppError::database_integrity("Integrity violation in the database.");
//! assert_eq!(err.kind(), ErrorKind::DatabaseIntegrity);
//! assert_eq!(err.status().as_u16(), 409);
//! assert_eq!(err.kind().type_name(), "DatabaseIntegrityError");
//! ```

use http::StatusCode;
use serde::Serialize;
use std::fmt;

/// Closed set of application error kinds.
///
/// The set grows only at build time; [`ErrorKind::status`] is an exhaustive
/// match so every kind has exactly one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Base kind for otherwise-untyped application errors.
    Application,
    /// Vault lookup miss.
    SecretNotFound,
    /// Vault value is null or empty.
    SecretEmpty,
    /// Credential acquisition or vault authentication failure.
    VaultAuth,
    /// Database connectivity or operational failure.
    DatabaseConnection,
    /// Generic database execution failure.
    DatabaseQuery,
    /// Constraint violation.
    DatabaseIntegrity,
    /// Requested resource does not exist.
    NotFound,
    /// Request payload failed validation.
    Validation,
    /// Route exists but does not accept the request method.
    MethodNotAllowed,
    /// Request exceeded the server-side deadline.
    Timeout,
    /// Unclassified fault (unexpected errors, panics).
    Internal,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Application,
        Self::SecretNotFound,
        Self::SecretEmpty,
        Self::VaultAuth,
        Self::DatabaseConnection,
        Self::DatabaseQuery,
        Self::DatabaseIntegrity,
        Self::NotFound,
        Self::Validation,
        Self::MethodNotAllowed,
        Self::Timeout,
        Self::Internal,
    ];

    /// HTTP status code for this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Application | Self::SecretEmpty => StatusCode::BAD_REQUEST,
            Self::SecretNotFound | Self::NotFound => StatusCode::NOT_FOUND,
            Self::VaultAuth | Self::DatabaseConnection => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseQuery | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DatabaseIntegrity => StatusCode::CONFLICT,
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// Name reported as `type` in the error envelope.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Application => "AppError",
            Self::SecretNotFound => "SecretNotFoundError",
            Self::SecretEmpty => "SecretEmptyError",
            Self::VaultAuth => "AzureAuthError",
            Self::DatabaseConnection => "DatabaseConnectionError",
            Self::DatabaseQuery => "DatabaseQueryError",
            Self::DatabaseIntegrity => "DatabaseIntegrityError",
            Self::NotFound => "NotFoundError",
            Self::Validation => "ValidationError",
            Self::MethodNotAllowed => "MethodNotAllowedError",
            Self::Timeout => "RequestTimeoutError",
            Self::Internal => "InternalServerError",
        }
    }

    /// Logging severity for this kind.
    #[must_use]
    pub fn severity(self) -> Severity {
        Severity::from_status(self.status())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Logging band derived from a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// 5xx: server-side fault, logged at error level.
    Critical,
    /// 4xx: caused by the client, logged at warn level.
    Client,
    /// Anything else, logged at info level.
    Info,
}

impl Severity {
    /// Classify a status code into a logging band.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            Self::Critical
        } else if status.is_client_error() {
            Self::Client
        } else {
            Self::Info
        }
    }
}

/// Application error.
///
/// Immutable once built. The `source` chain is never serialized to clients.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause (diagnostics only).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Base application error (400).
    #[must_use]
    pub fn application(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Application, message)
    }

    /// Secret missing from the vault (404).
    #[must_use]
    pub fn secret_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SecretNotFound, message)
    }

    /// Secret present but empty (400).
    #[must_use]
    pub fn secret_empty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SecretEmpty, message)
    }

    /// Vault authentication failure (503).
    #[must_use]
    pub fn vault_auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VaultAuth, message)
    }

    /// Database connectivity failure (503).
    #[must_use]
    pub fn database_connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DatabaseConnection, message)
    }

    /// Database execution failure (500).
    #[must_use]
    pub fn database_query(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DatabaseQuery, message)
    }

    /// Constraint violation (409).
    #[must_use]
    pub fn database_integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DatabaseIntegrity, message)
    }

    /// Resource not found (404).
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, format!("{resource} with id {id} not found"))
    }

    /// Validation failure (422).
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Request deadline exceeded (408).
    #[must_use]
    pub fn timeout(limit: std::time::Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("Request did not complete within {} ms", limit.as_millis()),
        )
    }

    /// Unclassified fault (500).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// Underlying cause, if any.
    #[must_use]
    pub const fn cause(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    /// Client-visible envelope.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: true,
            kind: self.kind.type_name(),
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

/// JSON error envelope: `{"error": true, "type": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Always `true`.
    pub error: bool,
    /// Error kind name.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
}
