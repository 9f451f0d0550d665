//! Activity logging service.
//!
//! Append-only audit trail of synchronization work. Writes go through
//! [`ActivityLogger::record`], which never fails the caller: a write that
//! cannot be persisted is reported through `tracing` and dropped.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skateshop_core::{ActivityLogEntry, ActivityLogFilter, ActivityStatistics, NewActivityLogEntry};

use crate::db::RepositoryError;

/// Storage backend for activity log entries.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Persist a new entry and return it with its ID and timestamp.
    async fn append(&self, entry: NewActivityLogEntry) -> Result<ActivityLogEntry, RepositoryError>;

    /// Entries matching `filter`, newest first, at most `filter.effective_limit()`.
    async fn query(&self, filter: &ActivityLogFilter)
    -> Result<Vec<ActivityLogEntry>, RepositoryError>;

    /// Aggregates over entries created in `[from, to)`.
    async fn statistics(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ActivityStatistics, RepositoryError>;
}

/// Shared handle to the activity log.
#[derive(Clone)]
pub struct ActivityLogger {
    log: Arc<dyn ActivityLog>,
}

impl std::fmt::Debug for ActivityLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLogger").finish_non_exhaustive()
    }
}

impl ActivityLogger {
    #[must_use]
    pub fn new(log: Arc<dyn ActivityLog>) -> Self {
        Self { log }
    }

    /// Record an entry, falling back to the error log if it cannot be stored.
    ///
    /// Returns the stored entry, or `None` when the write failed.
    pub async fn record(&self, entry: NewActivityLogEntry) -> Option<ActivityLogEntry> {
        let action = entry.action.clone();
        let outcome = entry.outcome;

        match self.log.append(entry).await {
            Ok(stored) => {
                tracing::debug!(id = %stored.id, action = %stored.action, "Activity recorded");
                Some(stored)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    action = %action,
                    outcome = %outcome,
                    "Failed to write activity log entry"
                );
                None
            }
        }
    }

    /// Query entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    pub async fn query(
        &self,
        filter: &ActivityLogFilter,
    ) -> Result<Vec<ActivityLogEntry>, RepositoryError> {
        self.log.query(filter).await
    }

    /// Aggregate statistics over a time window.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    pub async fn statistics(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ActivityStatistics, RepositoryError> {
        self.log.statistics(from, to).await
    }
}
