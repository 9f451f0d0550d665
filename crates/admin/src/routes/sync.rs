//! Synchronization trigger handlers.
//!
//! Both routes answer with the run summary. A run that finishes with some
//! failed kinds is still a 200: the envelope's `success` is false and the
//! message names the kinds that failed.
//!
//! The run itself is spawned onto its own task, so a client that disconnects
//! or a proxy that times out cannot cancel it halfway through a kind. The
//! handler only waits for the result.

use axum::{Json, Router, extract::State, routing::get, routing::post};
use skateshop_core::SyncRunSummary;
use tokio::task::JoinHandle;

use super::ApiResponse;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;
use crate::sync::SyncError;

/// Build the sync router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync", get(sync_all))
        .route("/sync/promotions", post(sync_promotions))
}

/// Synchronize every entity kind.
///
/// GET /sync
async fn sync_all(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SyncRunSummary>>, AppError> {
    tracing::info!(actor = %admin.username, "Full synchronization requested");
    let service = state.sync().clone();
    let actor = admin.username;
    let summary = join(tokio::spawn(async move { service.run_full(Some(&actor)).await })).await?;
    Ok(Json(ApiResponse::from(summary)))
}

/// Synchronize promotions only.
///
/// POST /sync/promotions
async fn sync_promotions(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SyncRunSummary>>, AppError> {
    tracing::info!(actor = %admin.username, "Promotion synchronization requested");
    let service = state.sync().clone();
    let actor = admin.username;
    let summary =
        join(tokio::spawn(async move { service.run_promotions(Some(&actor)).await })).await?;
    Ok(Json(ApiResponse::from(summary)))
}

/// Wait for a spawned run.
async fn join(
    handle: JoinHandle<Result<SyncRunSummary, SyncError>>,
) -> Result<SyncRunSummary, AppError> {
    match handle.await {
        Ok(result) => Ok(result?),
        Err(e) => {
            tracing::error!(error = %e, "Synchronization task failed");
            Err(AppError::Internal(format!("synchronization task failed: {e}")))
        }
    }
}
