//! CLI subcommands.

pub mod activity;
pub mod migrate;
pub mod sync;

use skateshop_admin::config::{ConfigError, database_url_from_env};
use skateshop_admin::db::{RepositoryError, create_pool};
use skateshop_admin::shopify::AdminShopifyError;
use skateshop_admin::sync::SyncError;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Shopify client could not be built.
    #[error("Shopify client error: {0}")]
    Shopify(#[from] AdminShopifyError),

    /// Synchronization run was aborted.
    #[error("{0}")]
    Sync(#[from] SyncError),

    /// Invalid command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connect to the admin database named by `ADMIN_DATABASE_URL` (or `DATABASE_URL`).
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to admin database...");
    Ok(create_pool(&database_url).await?)
}
