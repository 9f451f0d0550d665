//! Session middleware configuration for admin.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions with
//! strict cookie settings (SameSite=Strict, 24hr inactivity expiry).

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "skateshop_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Admin configuration (for determining HTTPS mode)
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (should never happen
/// with hardcoded "admin" and "session" values).
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    // The session table is created by the admin migrations.
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    session_layer_with_store(store, config.is_https())
}

/// Apply the admin cookie settings to any session store.
#[must_use]
pub fn session_layer_with_store<S: SessionStore + Clone>(
    store: S,
    secure: bool,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
