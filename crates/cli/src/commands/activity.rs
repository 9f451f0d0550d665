//! Activity log commands.
//!
//! # Usage
//!
//! ```bash
//! # Most recent entries
//! skate-cli activity list --limit 20
//!
//! # Failed order synchronizations
//! skate-cli activity list --kind orders --outcome error
//!
//! # Statistics for the last 24 hours
//! skate-cli activity stats --hours 24
//! ```

use chrono::{Duration, Utc};
use skateshop_admin::db::ActivityLogRepository;
use skateshop_core::{ActivityLogFilter, EntityKind, SyncOutcome};

use super::{CommandError, connect};

/// List activity entries, newest first.
///
/// # Errors
///
/// Returns an error if an argument is invalid or the query fails.
pub async fn list(
    kind: Option<&str>,
    outcome: Option<&str>,
    limit: i64,
) -> Result<(), CommandError> {
    let filter = ActivityLogFilter {
        entity_kind: kind
            .map(str::parse::<EntityKind>)
            .transpose()
            .map_err(|e| CommandError::InvalidArgument(e.to_string()))?,
        outcome: outcome
            .map(str::parse::<SyncOutcome>)
            .transpose()
            .map_err(CommandError::InvalidArgument)?,
        limit: Some(limit),
        ..ActivityLogFilter::default()
    };

    let pool = connect().await?;
    let entries = ActivityLogRepository::new(&pool).query(&filter).await?;

    if entries.is_empty() {
        tracing::info!("No activity recorded");
    }
    for entry in entries {
        tracing::info!(
            "#{} {} {} [{}] {}ms by {}: {}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            entry.outcome,
            entry.duration_ms,
            entry.actor_id.as_deref().unwrap_or("system"),
            entry.description
        );
    }

    Ok(())
}

/// Print aggregate statistics, optionally over the last `hours`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn stats(hours: Option<i64>) -> Result<(), CommandError> {
    let from = match hours {
        Some(h) if h <= 0 => {
            return Err(CommandError::InvalidArgument(
                "--hours must be positive".to_string(),
            ));
        }
        Some(h) => Some(Utc::now() - Duration::hours(h)),
        None => None,
    };

    let pool = connect().await?;
    let stats = ActivityLogRepository::new(&pool)
        .statistics(from, None)
        .await?;

    tracing::info!(
        "{} runs: {} success, {} warning, {} error, average {:.0}ms",
        stats.total_runs,
        stats.success_count,
        stats.warning_count,
        stats.error_count,
        stats.average_duration_ms
    );

    Ok(())
}
