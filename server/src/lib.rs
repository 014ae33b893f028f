//! # Posgrado Server
//!
//! HTTP backend for tracking graduate students through the thesis process.
//!
//! ## Startup
//!
//! 1. Load `.env` and snapshot the environment
//! 2. Install logging ([`logging::init`])
//! 3. Pick the secret backend ([`settings::SecretsBackend`]) and resolve
//!    [`Settings`] (fails fast on any missing secret)
//! 4. Build the pool, install the schema on the local database
//! 5. Assemble the application ([`factory::create`]) and serve
//!
//! ## Request Flow
//!
//! ```text
//! request ─▶ X-Request-ID + span ─▶ CORS ─▶ router ─▶ handler
//!                                                      │
//!                                          Database::scoped(session)
//!                                                      │
//!           JSON body ◀── AppError::into_response ◀── Err(AppError)
//! ```

pub mod factory;
pub mod logging;
pub mod routes;
pub mod settings;
pub mod state;

pub use factory::create;
pub use settings::{EnvMap, Settings};
pub use state::AppState;
