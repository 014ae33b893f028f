//! Database access for the Posgrado backend.
//!
//! - [`Database`]: lazily-connected pool that pings connections before use
//! - [`Session`]: one transaction, ended exactly once by commit, rollback or drop
//! - [`classify`]: maps driver failures onto the application error taxonomy
//! - [`schema`]: table definitions for `PostgreSQL` and the local `SQLite` fallback
//! - [`repo`]: queries per table group
//!
//! Handlers either drive a session explicitly:
//!
//! ```no_run
//! # use posgrado_database::{Database, repo};
//! # async fn example(db: &Database) -> Result<(), posgrado_core::AppError> {
//! let mut session = db.begin().await?;
//! let teacher = repo::teachers::get(&mut session, 1).await?;
//! session.commit().await?;
//! # Ok(())
//! # }
//! ```
//!
//! or hand a closure to [`Database::scoped`], which commits on `Ok` and rolls
//! back on `Err`.

pub mod error;
pub mod pool;
pub mod repo;
pub mod schema;
pub mod session;
pub mod stats;
pub mod target;

pub use error::classify;
pub use pool::{Database, PoolOptions};
pub use repo::Page;
pub use session::Session;
pub use stats::{SessionStats, SessionStatsSnapshot};
pub use target::{Backend, DatabaseTarget};
