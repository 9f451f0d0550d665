//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin username; recorded as the actor on activity log entries.
    pub username: String,
    /// When the session was authenticated.
    pub logged_in_at: DateTime<Utc>,
}

impl CurrentAdmin {
    /// Identity for a login that just succeeded.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            logged_in_at: Utc::now(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
