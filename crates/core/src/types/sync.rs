//! Synchronization outcomes and per-run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;

/// Outcome of one synchronization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.sync_outcome", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Every fetched record was written.
    Success,
    /// Fetching failed; nothing was written for the kind.
    Error,
    /// Fetching completed but some records were rejected by the store.
    Warning,
}

impl SyncOutcome {
    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            _ => Err(format!("invalid sync outcome: {s}")),
        }
    }
}

/// Result of synchronizing one entity kind within a run.
///
/// Produced once per kind per run and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySyncResult {
    pub entity_kind: EntityKind,
    pub items_fetched: u64,
    pub items_written: u64,
    /// Records rejected by mapping or by the store.
    pub items_failed: u64,
    pub outcome: SyncOutcome,
    pub error_message: Option<String>,
    pub duration_ms: u64,
    /// Underlying page-fetch calls, retries included.
    pub fetch_attempts: u32,
}

impl EntitySyncResult {
    /// Result for a kind whose pages were all fetched.
    ///
    /// The outcome is `Success` when nothing failed and `Warning` otherwise;
    /// `first_failure` becomes the error message in the latter case.
    #[must_use]
    pub fn completed(
        entity_kind: EntityKind,
        items_fetched: u64,
        items_written: u64,
        items_failed: u64,
        duration_ms: u64,
        fetch_attempts: u32,
        first_failure: Option<String>,
    ) -> Self {
        let (outcome, error_message) = if items_failed == 0 {
            (SyncOutcome::Success, None)
        } else {
            let detail = first_failure.map_or_else(String::new, |e| format!(" (first: {e})"));
            (
                SyncOutcome::Warning,
                Some(format!(
                    "{items_failed} of {items_fetched} {} failed to write{detail}",
                    entity_kind.plural()
                )),
            )
        };

        Self {
            entity_kind,
            items_fetched,
            items_written,
            items_failed,
            outcome,
            error_message,
            duration_ms,
            fetch_attempts,
        }
    }

    /// Result for a kind whose fetch failed fatally.
    #[must_use]
    pub const fn failed(
        entity_kind: EntityKind,
        items_fetched: u64,
        error_message: String,
        duration_ms: u64,
        fetch_attempts: u32,
    ) -> Self {
        Self {
            entity_kind,
            items_fetched,
            items_written: 0,
            items_failed: 0,
            outcome: SyncOutcome::Error,
            error_message: Some(error_message),
            duration_ms,
            fetch_attempts,
        }
    }

    /// Whether the kind synchronized without any failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == SyncOutcome::Success
    }
}

/// Summary of one run, returned to the caller and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRunSummary {
    /// True iff every kind finished with `Success`.
    pub success: bool,
    pub results: Vec<EntitySyncResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncRunSummary {
    /// Aggregate per-kind results into a run summary.
    #[must_use]
    pub fn from_results(
        results: Vec<EntitySyncResult>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let success = results.iter().all(EntitySyncResult::is_success);
        Self {
            success,
            results,
            started_at,
            finished_at,
        }
    }

    /// Result for a given kind, if it was part of the run.
    #[must_use]
    pub fn result_for(&self, kind: EntityKind) -> Option<&EntitySyncResult> {
        self.results.iter().find(|r| r.entity_kind == kind)
    }

    /// Kinds that did not finish with `Success`, in processing order.
    #[must_use]
    pub fn unsuccessful_kinds(&self) -> Vec<EntityKind> {
        self.results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.entity_kind)
            .collect()
    }

    /// Total records written across all kinds.
    #[must_use]
    pub fn total_written(&self) -> u64 {
        self.results.iter().map(|r| r.items_written).sum()
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        u64::try_from((self.finished_at - self.started_at).num_milliseconds()).unwrap_or(0)
    }

    /// Human-readable one-line description of the run.
    #[must_use]
    pub fn message(&self) -> String {
        if self.success {
            return format!(
                "Synchronized {} records across {} entity kinds",
                self.total_written(),
                self.results.len()
            );
        }

        let failed = self
            .unsuccessful_kinds()
            .iter()
            .map(EntityKind::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Synchronization finished with problems in: {failed}")
    }
}
