//! Activity log repository.
//!
//! `admin.activity_log` is append-only: this module only inserts and reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skateshop_core::{ActivityLogEntry, ActivityLogFilter, ActivityStatistics, NewActivityLogEntry};
use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;
use crate::services::ActivityLog;

const ENTRY_COLUMNS: &str = "id, actor_id, action, entity_kind, entity_id, description, \
                             metadata, outcome, error_message, duration_ms, created_at";

/// Internal row type for the statistics query.
#[derive(Debug, sqlx::FromRow)]
struct StatisticsRow {
    total_runs: i64,
    success_count: i64,
    error_count: i64,
    warning_count: i64,
    average_duration_ms: f64,
}

impl From<StatisticsRow> for ActivityStatistics {
    fn from(row: StatisticsRow) -> Self {
        Self {
            total_runs: row.total_runs,
            success_count: row.success_count,
            error_count: row.error_count,
            warning_count: row.warning_count,
            average_duration_ms: row.average_duration_ms,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for activity log database operations.
pub struct ActivityLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityLogRepository<'a> {
    /// Create a new activity log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        entry: &NewActivityLogEntry,
    ) -> Result<ActivityLogEntry, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO admin.activity_log (
                actor_id, action, entity_kind, entity_id, description,
                metadata, outcome, error_message, duration_ms
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ENTRY_COLUMNS}
            "
        );

        let stored = sqlx::query_as::<_, ActivityLogEntry>(&sql)
            .bind(&entry.actor_id)
            .bind(&entry.action)
            .bind(entry.entity_kind)
            .bind(&entry.entity_id)
            .bind(&entry.description)
            .bind(&entry.metadata)
            .bind(entry.outcome)
            .bind(&entry.error_message)
            .bind(entry.duration_ms)
            .fetch_one(self.pool)
            .await?;

        Ok(stored)
    }

    /// Entries matching every filter that is set, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn query(
        &self,
        filter: &ActivityLogFilter,
    ) -> Result<Vec<ActivityLogEntry>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ENTRY_COLUMNS}
            FROM admin.activity_log
            WHERE ($1::text IS NULL OR actor_id = $1)
              AND ($2::text IS NULL OR action = $2)
              AND ($3::admin.entity_kind IS NULL OR entity_kind = $3)
              AND ($4::admin.sync_outcome IS NULL OR outcome = $4)
            ORDER BY created_at DESC, id DESC
            LIMIT $5
            "
        );

        let entries = sqlx::query_as::<_, ActivityLogEntry>(&sql)
            .bind(&filter.actor_id)
            .bind(&filter.action)
            .bind(filter.entity_kind)
            .bind(filter.outcome)
            .bind(filter.effective_limit())
            .fetch_all(self.pool)
            .await?;

        Ok(entries)
    }

    /// Aggregates over entries created in `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn statistics(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ActivityStatistics, RepositoryError> {
        let row = sqlx::query_as::<_, StatisticsRow>(
            r"
            SELECT
                COUNT(*) AS total_runs,
                COUNT(*) FILTER (WHERE outcome = 'success') AS success_count,
                COUNT(*) FILTER (WHERE outcome = 'error') AS error_count,
                COUNT(*) FILTER (WHERE outcome = 'warning') AS warning_count,
                COALESCE(AVG(duration_ms)::float8, 0) AS average_duration_ms
            FROM admin.activity_log
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}

// =============================================================================
// ActivityLog
// =============================================================================

/// [`ActivityLog`] backed by the admin `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgActivityLog {
    pool: PgPool,
}

impl PgActivityLog {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLog for PgActivityLog {
    #[instrument(skip(self, entry), fields(action = %entry.action))]
    async fn append(
        &self,
        entry: NewActivityLogEntry,
    ) -> Result<ActivityLogEntry, RepositoryError> {
        ActivityLogRepository::new(&self.pool).insert(&entry).await
    }

    async fn query(
        &self,
        filter: &ActivityLogFilter,
    ) -> Result<Vec<ActivityLogEntry>, RepositoryError> {
        ActivityLogRepository::new(&self.pool).query(filter).await
    }

    async fn statistics(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ActivityStatistics, RepositoryError> {
        ActivityLogRepository::new(&self.pool)
            .statistics(from, to)
            .await
    }
}
