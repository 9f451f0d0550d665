//! Activity-log records.
//!
//! The activity log is append-only: entries are written once and never
//! updated or deleted by the application. Retention is handled outside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::id::ActivityLogId;
use super::sync::{EntitySyncResult, SyncOutcome};

/// Upper bound on the number of entries a single query returns.
pub const MAX_QUERY_LIMIT: i64 = 100;

/// Default page size for activity-log queries.
pub const DEFAULT_QUERY_LIMIT: i64 = 50;

/// A persisted activity-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ActivityLogEntry {
    pub id: ActivityLogId,
    /// Authenticated actor, or `None` for system runs.
    pub actor_id: Option<String>,
    pub action: String,
    pub entity_kind: EntityKind,
    pub entity_id: Option<String>,
    pub description: String,
    pub metadata: serde_json::Value,
    pub outcome: SyncOutcome,
    pub error_message: Option<String>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// An entry about to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivityLogEntry {
    pub actor_id: Option<String>,
    pub action: String,
    pub entity_kind: EntityKind,
    pub entity_id: Option<String>,
    pub description: String,
    pub metadata: serde_json::Value,
    pub outcome: SyncOutcome,
    pub error_message: Option<String>,
    pub duration_ms: i64,
}

impl NewActivityLogEntry {
    /// Build the entry describing one kind's synchronization result.
    #[must_use]
    pub fn from_sync_result(result: &EntitySyncResult, actor_id: Option<&str>) -> Self {
        let description = match result.outcome {
            SyncOutcome::Success => format!(
                "Synchronized {} {} from Shopify",
                result.items_written,
                result.entity_kind.plural()
            ),
            SyncOutcome::Warning => format!(
                "Synchronized {} of {} {} from Shopify",
                result.items_written,
                result.items_fetched,
                result.entity_kind.plural()
            ),
            SyncOutcome::Error => {
                format!("Failed to synchronize {}", result.entity_kind.plural())
            }
        };

        Self {
            actor_id: actor_id.map(String::from),
            action: result.entity_kind.sync_action(),
            entity_kind: result.entity_kind,
            entity_id: None,
            description,
            metadata: serde_json::json!({
                "items_fetched": result.items_fetched,
                "items_written": result.items_written,
                "items_failed": result.items_failed,
                "fetch_attempts": result.fetch_attempts,
            }),
            outcome: result.outcome,
            error_message: result.error_message.clone(),
            duration_ms: i64::try_from(result.duration_ms).unwrap_or(i64::MAX),
        }
    }
}

/// Filters for querying the activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogFilter {
    pub actor_id: Option<String>,
    pub action: Option<String>,
    pub entity_kind: Option<EntityKind>,
    pub outcome: Option<SyncOutcome>,
    pub limit: Option<i64>,
}

impl ActivityLogFilter {
    /// Effective row limit, clamped to `1..=MAX_QUERY_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_QUERY_LIMIT)
            .clamp(1, MAX_QUERY_LIMIT)
    }

    /// Whether an entry satisfies every filter that is set.
    #[must_use]
    pub fn matches(&self, entry: &ActivityLogEntry) -> bool {
        self.actor_id
            .as_ref()
            .is_none_or(|a| entry.actor_id.as_ref() == Some(a))
            && self.action.as_ref().is_none_or(|a| &entry.action == a)
            && self.entity_kind.is_none_or(|k| entry.entity_kind == k)
            && self.outcome.is_none_or(|o| entry.outcome == o)
    }
}

/// Aggregate statistics over a window of the activity log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStatistics {
    pub total_runs: i64,
    pub success_count: i64,
    pub error_count: i64,
    pub warning_count: i64,
    /// Zero for an empty window.
    pub average_duration_ms: f64,
}

impl ActivityStatistics {
    /// Aggregate in memory over already-filtered entries.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ActivityLogEntry>) -> Self {
        let mut stats = Self::default();
        let mut total_duration: i64 = 0;

        for entry in entries {
            stats.total_runs += 1;
            total_duration = total_duration.saturating_add(entry.duration_ms);
            match entry.outcome {
                SyncOutcome::Success => stats.success_count += 1,
                SyncOutcome::Error => stats.error_count += 1,
                SyncOutcome::Warning => stats.warning_count += 1,
            }
        }

        if stats.total_runs > 0 {
            #[allow(clippy::cast_precision_loss)] // Durations and counts stay far below 2^52
            {
                stats.average_duration_ms = total_duration as f64 / stats.total_runs as f64;
            }
        }

        stats
    }

    /// Whether a timestamp falls inside `[from, to)`.
    #[must_use]
    pub fn in_window(
        at: DateTime<Utc>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> bool {
        from.is_none_or(|f| at >= f) && to.is_none_or(|t| at < t)
    }
}
