//! Authentication route handlers for admin.
//!
//! Username/password login against the configured operator account; the
//! authenticated identity is kept in the server-side session.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tower_sessions::Session;

use super::ApiResponse;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::{AdminAuthError, verify_credentials};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Log in and store the admin identity in the session.
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let config = state.config();

    verify_credentials(
        &config.credentials,
        &config.session_secret,
        &body.username,
        &body.password,
    )
    .map_err(|e| match e {
        AdminAuthError::InvalidCredentials => {
            tracing::warn!(username = %body.username, "Rejected admin login");
            AppError::Unauthorized(e.to_string())
        }
        AdminAuthError::Misconfigured => AppError::Internal(e.to_string()),
    })?;

    // New session ID on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    let admin = CurrentAdmin::new(body.username);
    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&admin.username);

    tracing::info!(username = %admin.username, "Admin logged in");

    Ok(Json(ApiResponse::message("Logged in")))
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> Result<Json<ApiResponse<()>>, AppError> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();

    Ok(Json(ApiResponse::message("Logged out")))
}
