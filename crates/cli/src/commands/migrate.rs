//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! skate-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! `crates/admin/migrations/`:
//! ```text
//! migrations/
//! ├── 20260301000001_create_admin_schema.sql
//! ├── 20260301000002_create_mirror_tables.sql
//! └── 20260301000003_create_activity_log.sql
//! ```

use super::{CommandError, connect};

/// Run admin database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
