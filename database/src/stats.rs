//! Session lifecycle counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts of sessions opened and how each one ended.
///
/// Shared by every session handed out by one [`Database`](crate::Database).
/// Also mirrored to the `db.sessions.*` metrics counters.
#[derive(Debug, Default)]
pub struct SessionStats {
    opened: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
}

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatsSnapshot {
    /// Sessions begun.
    pub opened: u64,
    /// Sessions committed.
    pub committed: u64,
    /// Sessions rolled back, explicitly or by drop.
    pub rolled_back: u64,
}

impl SessionStatsSnapshot {
    /// Sessions neither committed nor rolled back yet.
    #[must_use]
    pub const fn in_flight(&self) -> u64 {
        self.opened
            .saturating_sub(self.committed)
            .saturating_sub(self.rolled_back)
    }
}

impl SessionStats {
    pub(crate) fn record_open(&self) {
        self.opened.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("db.sessions.opened").increment(1);
    }

    pub(crate) fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("db.sessions.committed").increment(1);
    }

    pub(crate) fn record_rollback(&self) {
        self.rolled_back.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("db.sessions.rolled_back").increment(1);
    }

    /// Current counts.
    #[must_use]
    pub fn snapshot(&self) -> SessionStatsSnapshot {
        SessionStatsSnapshot {
            opened: self.opened.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
        }
    }
}
