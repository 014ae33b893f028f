//! # Posgrado Testing
//!
//! Fixtures for exercising the backend end to end without external services.
//!
//! - [`local_secrets`]: in-memory secrets selecting the local database
//! - [`TestDatabase`]: a temporary `SQLite` file with the schema installed
//! - [`TestApp`]: the fully assembled router over a [`TestDatabase`], driven
//!   with `tower::ServiceExt::oneshot`
//! - [`fixtures`]: valid payloads for teachers, programs, students and processes
//!
//! ## Example
//!
//! ```no_run
//! use posgrado_testing::TestApp;
//!
//! # async fn example() -> Result<(), posgrado_core::AppError> {
//! let app = TestApp::new().await?;
//! let response = app.get("/").await?;
//! assert_eq!(response.status.as_u16(), 200);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod fixtures;

pub use app::{TestApp, TestDatabase, TestResponse};

use posgrado_secrets::InMemorySecretProvider;

/// Session secret used by [`local_secrets`].
pub const TEST_SESSION_SECRET: &str = "posgrado-test-session-secret";

/// Secrets for a local run: a session key and an empty `DB-HOST`.
#[must_use]
pub fn local_secrets() -> InMemorySecretProvider {
    InMemorySecretProvider::new()
        .with_secret("SESSION-SECRET-KEY", TEST_SESSION_SECRET)
        .with_secret("DB-HOST", "")
}
