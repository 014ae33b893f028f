//! Application state shared by every handler.

use crate::settings::Settings;
use axum::extract::FromRef;
use posgrado_database::Database;
use std::sync::Arc;

/// Dependencies injected into the routers.
///
/// Cloned per request; both fields are reference-counted.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Resolved configuration.
    pub settings: Arc<Settings>,
    /// Connection pool and session factory.
    pub db: Database,
}

impl AppState {
    /// Bundle the settings and the database handle.
    #[must_use]
    pub const fn new(settings: Arc<Settings>, db: Database) -> Self {
        Self { settings, db }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.settings)
    }
}
