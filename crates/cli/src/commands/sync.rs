//! Synchronization command.
//!
//! # Usage
//!
//! ```bash
//! # Synchronize every entity kind
//! skate-cli sync
//!
//! # Synchronize selected kinds, in the given order
//! skate-cli sync --kind products --kind promotions
//! ```
//!
//! Runs started here are recorded in the activity log without an actor.

use std::sync::Arc;

use skateshop_admin::config::{ShopifyAdminConfig, SyncConfig};
use skateshop_admin::db::{PgActivityLog, PgCatalogStore};
use skateshop_admin::services::ActivityLogger;
use skateshop_admin::shopify::AdminClient;
use skateshop_admin::sync::SyncService;
use skateshop_core::{EntityKind, SyncOutcome};

use super::{CommandError, connect};

/// Synchronize `kinds` (all kinds when empty).
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is unreachable,
/// or Shopify rejects the access token.
pub async fn run(kinds: &[String]) -> Result<(), CommandError> {
    let kinds = parse_kinds(kinds)?;
    let pool = connect().await?;

    let shopify = ShopifyAdminConfig::from_env()?;
    let sync_config = SyncConfig::from_env()?;

    let service = SyncService::new(
        Arc::new(AdminClient::new(&shopify)?),
        Arc::new(PgCatalogStore::new(pool.clone())),
        ActivityLogger::new(Arc::new(PgActivityLog::new(pool))),
        &sync_config,
    );

    tracing::info!(store = %shopify.store, "Synchronizing {} entity kinds...", kinds.len());
    let summary = service.run(&kinds, None).await?;

    for result in &summary.results {
        match result.outcome {
            SyncOutcome::Success => tracing::info!(
                "{}: {} fetched, {} written",
                result.entity_kind.plural(),
                result.items_fetched,
                result.items_written
            ),
            SyncOutcome::Warning | SyncOutcome::Error => tracing::warn!(
                "{}: {} ({} fetched, {} written, {} failed): {}",
                result.entity_kind.plural(),
                result.outcome,
                result.items_fetched,
                result.items_written,
                result.items_failed,
                result.error_message.as_deref().unwrap_or("-")
            ),
        }
    }

    tracing::info!("{}", summary.message());
    Ok(())
}

fn parse_kinds(raw: &[String]) -> Result<Vec<EntityKind>, CommandError> {
    if raw.is_empty() {
        return Ok(EntityKind::ALL.to_vec());
    }

    let mut kinds = Vec::with_capacity(raw.len());
    for value in raw {
        let kind = value
            .parse::<EntityKind>()
            .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
