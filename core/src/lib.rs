//! # Posgrado Core
//!
//! Shared types for the graduate-school thesis tracking backend.
//!
//! ## Core Concepts
//!
//! - **[`AppError`]**: the single error type that reaches clients, tagged with an [`ErrorKind`]
//! - **[`ErrorKind`]**: closed taxonomy; each kind maps to exactly one HTTP status
//! - **Domain model**: programs, students, enrollments, teachers and thesis processes
//!
//! Infrastructure crates (secrets, database) convert their own errors into
//! [`AppError`]; the web layer turns it into a JSON envelope
//! (`{"error": true, "type": ..., "message": ...}`) when the `axum` feature is on.
//!
//! ## Example
//!
//! ```
//! use posgrado_core::domain::ProcessStage;
//! use posgrado_core::{AppError, ErrorKind};
//!
//! assert_eq!(ProcessStage::Enrollment.next(), Some(ProcessStage::Turnitin));
//!
//! let err = ProcessStage::parse("defensa").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! assert_eq!(err.status().as_u16(), 422);
//! # let _ = AppError::internal("unused");
//! ```

pub mod domain;
pub mod error;

#[cfg(feature = "axum")]
mod response;

pub use error::{AppError, ErrorBody, ErrorKind, Severity};

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;
