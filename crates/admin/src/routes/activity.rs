//! Activity log handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use skateshop_core::{ActivityLogEntry, ActivityLogFilter, ActivityStatistics, EntityKind, SyncOutcome};

use super::ApiResponse;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the activity router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/activity", get(list))
        .route("/activity/stats", get(stats))
}

/// Query parameters for `GET /activity`.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub actor_id: Option<String>,
    pub action: Option<String>,
    pub entity_kind: Option<String>,
    pub outcome: Option<String>,
    pub limit: Option<i64>,
}

impl TryFrom<ActivityQuery> for ActivityLogFilter {
    type Error = AppError;

    fn try_from(q: ActivityQuery) -> Result<Self, Self::Error> {
        let entity_kind = q
            .entity_kind
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<EntityKind>())
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let outcome = q
            .outcome
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<SyncOutcome>())
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(Self {
            actor_id: q.actor_id.filter(|s| !s.is_empty()),
            action: q.action.filter(|s| !s.is_empty()),
            entity_kind,
            outcome,
            limit: q.limit,
        })
    }
}

/// Query parameters for `GET /activity/stats` (RFC 3339 timestamps).
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// List activity entries, newest first.
///
/// GET /activity
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityLogEntry>>>, AppError> {
    let filter = ActivityLogFilter::try_from(query)?;
    let entries = state.activity().query(&filter).await?;

    Ok(Json(ApiResponse::ok(
        format!("{} entries", entries.len()),
        entries,
    )))
}

/// Aggregate statistics over a time window.
///
/// GET /activity/stats
async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<ActivityStatistics>>, AppError> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from >= to
    {
        return Err(AppError::BadRequest(
            "`from` must be earlier than `to`".to_string(),
        ));
    }

    let statistics = state.activity().statistics(query.from, query.to).await?;

    Ok(Json(ApiResponse::ok(
        format!("{} runs", statistics.total_runs),
        statistics,
    )))
}
