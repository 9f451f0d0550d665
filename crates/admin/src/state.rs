//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::{PgActivityLog, PgCatalogStore};
use crate::services::ActivityLogger;
use crate::shopify::{AdminClient, AdminShopifyError};
use crate::sync::SyncService;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    sync: SyncService,
    activity: ActivityLogger,
}

impl AppState {
    /// Wire the production services: Shopify Admin API, `PostgreSQL` store
    /// and activity log.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify HTTP client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, AdminShopifyError> {
        let activity = ActivityLogger::new(Arc::new(PgActivityLog::new(pool.clone())));
        let sync = SyncService::new(
            Arc::new(AdminClient::new(&config.shopify)?),
            Arc::new(PgCatalogStore::new(pool.clone())),
            activity.clone(),
            &config.sync,
        );

        Ok(Self::from_parts(config, pool, sync, activity))
    }

    /// Build state from already-constructed services.
    #[must_use]
    pub fn from_parts(
        config: AdminConfig,
        pool: PgPool,
        sync: SyncService,
        activity: ActivityLogger,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sync,
                activity,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn sync(&self) -> &SyncService {
        &self.inner.sync
    }

    #[must_use]
    pub fn activity(&self) -> &ActivityLogger {
        &self.inner.activity
    }
}
