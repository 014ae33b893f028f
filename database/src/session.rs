//! Transactional unit of work.

use crate::error::classify;
use crate::stats::SessionStats;
use posgrado_core::AppError;
use sqlx::{Any, AnyConnection, Transaction};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// One open transaction.
///
/// A session ends exactly once: [`commit`](Self::commit) and
/// [`rollback`](Self::rollback) consume it, and dropping it unfinished
/// (early return, cancelled request) rolls the transaction back.
pub struct Session {
    id: u64,
    tx: Option<Transaction<'static, Any>>,
    stats: Arc<SessionStats>,
}

impl Session {
    pub(crate) fn new(tx: Transaction<'static, Any>, stats: Arc<SessionStats>) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        stats.record_open();
        tracing::trace!(session_id = id, "Database session opened");
        Self {
            id,
            tx: Some(tx),
            stats,
        }
    }

    /// Process-unique session number, for logs.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Connection to run statements on.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the session has already ended.
    pub fn conn(&mut self) -> Result<&mut AnyConnection, AppError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| AppError::internal("Database session already closed."))
    }

    /// Commit the transaction.
    ///
    /// # Errors
    ///
    /// Returns the classified driver error if the commit fails; the
    /// transaction is then rolled back by the server.
    pub async fn commit(mut self) -> Result<(), AppError> {
        let Some(tx) = self.tx.take() else {
            return Err(AppError::internal("Database session already closed."));
        };

        match tx.commit().await {
            Ok(()) => {
                self.stats.record_commit();
                tracing::debug!(session_id = self.id, "Database session committed");
                Ok(())
            }
            Err(err) => {
                self.stats.record_rollback();
                Err(classify(err))
            }
        }
    }

    /// Roll the transaction back.
    ///
    /// # Errors
    ///
    /// Returns the classified driver error if the rollback statement fails.
    pub async fn rollback(mut self) -> Result<(), AppError> {
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };
        self.stats.record_rollback();
        tracing::debug!(session_id = self.id, "Database session rolled back");
        tx.rollback().await.map_err(classify)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The transaction's own drop queues the ROLLBACK on its connection.
        if self.tx.take().is_some() {
            self.stats.record_rollback();
            tracing::debug!(session_id = self.id, "Unfinished database session rolled back");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("open", &self.tx.is_some())
            .finish()
    }
}
