//! Shared connection pool.

use crate::error::classify;
use crate::session::Session;
use crate::stats::{SessionStats, SessionStatsSnapshot};
use crate::target::{Backend, DatabaseTarget};
use futures::future::BoxFuture;
use posgrado_core::AppError;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use std::sync::{Arc, Once};
use std::time::Duration;

static INSTALL_DRIVERS: Once = Once::new();

/// Pool sizing and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// How long a session may wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Handle to the database: a connection pool plus session bookkeeping.
///
/// Cheap to clone; every clone shares the same pool and counters.
///
/// # Example
///
/// ```no_run
/// use posgrado_database::{Database, DatabaseTarget, PoolOptions};
///
/// # async fn example() -> Result<(), posgrado_core::AppError> {
/// let target = DatabaseTarget::LocalFile { path: "posgrado_local.db".into() };
/// let db = Database::connect_lazy(&target, &PoolOptions::default())?;
///
/// let mut session = db.begin().await?;
/// sqlx::query("SELECT 1").execute(session.conn()?).await.map_err(posgrado_database::classify)?;
/// session.commit().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    backend: Backend,
    stats: Arc<SessionStats>,
}

impl Database {
    /// Build the pool without opening a connection yet.
    ///
    /// Each checkout is pinged before use, so stale connections are replaced
    /// transparently.
    ///
    /// # Errors
    ///
    /// Returns a `DatabaseConnection` error if the URL cannot be parsed.
    pub fn connect_lazy(target: &DatabaseTarget, options: &PoolOptions) -> Result<Self, AppError> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let pool = AnyPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .test_before_acquire(true)
            .connect_lazy(&target.url())
            .map_err(classify)?;

        tracing::info!(
            database = %target,
            backend = target.backend().as_str(),
            max_connections = options.max_connections,
            "Database pool configured"
        );

        Ok(Self {
            pool,
            backend: target.backend(),
            stats: Arc::new(SessionStats::default()),
        })
    }

    /// Dialect of the connected database.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Open a session (a transaction on a pooled connection).
    ///
    /// # Errors
    ///
    /// Returns the classified driver error, typically `DatabaseConnection`
    /// when no connection can be obtained in time.
    pub async fn begin(&self) -> Result<Session, AppError> {
        let tx = self.pool.begin().await.map_err(classify)?;
        Ok(Session::new(tx, Arc::clone(&self.stats)))
    }

    /// Run `work` inside a session: commit if it returns `Ok`, roll back if it
    /// returns `Err`. The session is released on every path.
    ///
    /// # Errors
    ///
    /// Returns the error from `work` unchanged, or the classified error of
    /// `begin`/`commit`.
    pub async fn scoped<T, F>(&self, work: F) -> Result<T, AppError>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<T, AppError>> + Send,
    {
        let mut session = self.begin().await?;

        match work(&mut session).await {
            Ok(value) => {
                session.commit().await?;
                Ok(value)
            }
            Err(err) => {
                let session_id = session.id();
                if let Err(rollback_err) = session.rollback().await {
                    tracing::warn!(
                        session_id,
                        error = %rollback_err,
                        "Rollback failed after handler error"
                    );
                }
                Err(err)
            }
        }
    }

    /// Round-trip a trivial query.
    ///
    /// # Errors
    ///
    /// Returns the classified driver error.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    /// Session counters.
    #[must_use]
    pub fn stats(&self) -> SessionStatsSnapshot {
        self.stats.snapshot()
    }

    /// Close every connection; further sessions fail.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
