//! Database operations for admin `PostgreSQL`.
//!
//! # Schema: `admin`
//!
//! ## Tables
//!
//! - `products`, `collections`, `customers`, `orders`, `promotions` - Local
//!   mirror of Shopify data, keyed by a serial ID plus a unique `shopify_id`
//! - `activity_log` - Append-only record of synchronization work
//! - `session` - Admin session storage (tower-sessions)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p skateshop-cli -- migrate
//! ```

pub mod activity_log;
pub mod catalog;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activity_log::{ActivityLogRepository, PgActivityLog};
pub use catalog::{CatalogRepository, PgCatalogStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
