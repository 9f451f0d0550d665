//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Auth
//! POST /auth/login             - Username/password login
//! POST /auth/logout            - Logout
//!
//! # Synchronization (session required)
//! GET  /sync                   - Synchronize every entity kind
//! POST /sync/promotions        - Synchronize promotions only
//!
//! # Activity log (session required)
//! GET  /activity               - Query entries
//! GET  /activity/stats         - Aggregate statistics
//! ```

pub mod activity;
pub mod auth;
pub mod health;
pub mod sync;

use axum::{Router, routing::get};
use serde::Serialize;
use skateshop_core::SyncRunSummary;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::state::AppState;

/// JSON envelope returned by every API route.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

impl From<SyncRunSummary> for ApiResponse<SyncRunSummary> {
    fn from(summary: SyncRunSummary) -> Self {
        Self {
            success: summary.success,
            message: summary.message(),
            data: Some(summary),
        }
    }
}

/// Build the API routes (without layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth::router())
        .merge(sync::router())
        .merge(activity::router())
}

/// Build the complete application: routes, session layer and request tracing.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(session_layer);

    routes()
        .layer(layers)
        .with_state(state)
}
