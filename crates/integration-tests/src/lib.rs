//! Integration test support for the skate shop admin.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no services needed)
//! cargo test -p skateshop-integration-tests
//!
//! # Database-backed tests
//! TEST_DATABASE_URL=postgres://localhost/skateshop_test \
//!     cargo test -p skateshop-integration-tests -- --ignored
//! ```
//!
//! The three synchronization seams have in-memory implementations here:
//!
//! - [`ScriptedRemote`] - replays scripted pages and errors per entity kind
//! - [`MemoryStore`] - keyed by `(kind, shopify_id)`, can reject chosen IDs
//! - [`MemoryActivityLog`] - append-only vector, can be switched to fail

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use skateshop_admin::config::{AdminConfig, AdminCredentials, ShopifyAdminConfig, SyncConfig};
use skateshop_admin::db::RepositoryError;
use skateshop_admin::middleware::session_layer_with_store;
use skateshop_admin::models::LocalRecord;
use skateshop_admin::services::{ActivityLog, ActivityLogger};
use skateshop_admin::shopify::{
    Money, RemoteCollection, RemoteCustomer, RemoteOrder, RemotePage, RemoteProduct,
    RemotePromotion, RemoteRecord,
};
use skateshop_admin::routes;
use skateshop_admin::state::AppState;
use skateshop_admin::sync::{LocalStore, RemoteError, RemoteSource, StoreError, SyncService};
use skateshop_core::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogId, ActivityStatistics, EntityKind,
    NewActivityLogEntry,
};
use sqlx::postgres::PgPoolOptions;

/// Username accepted by [`test_config`].
pub const TEST_USERNAME: &str = "ops";
/// Password accepted by [`test_config`].
pub const TEST_PASSWORD: &str = "kickflip-Varial-2026!";

// =============================================================================
// Remote
// =============================================================================

/// Remote source that replays scripted responses per entity kind.
///
/// Scripted responses are consumed in order. Once a kind's script is empty,
/// its fixed records (if any) are served as a single final page, so the same
/// data can be synchronized repeatedly.
#[derive(Debug, Default)]
pub struct ScriptedRemote {
    scripts: Mutex<HashMap<EntityKind, VecDeque<Result<RemotePage, RemoteError>>>>,
    fixed: Mutex<HashMap<EntityKind, Vec<RemoteRecord>>>,
    calls: Mutex<HashMap<EntityKind, u32>>,
    cursors: Mutex<Vec<(EntityKind, Option<String>)>>,
    delay: Option<Duration>,
}

impl ScriptedRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `records` as one final page every time `kind` is fetched.
    #[must_use]
    pub fn with_records(self, kind: EntityKind, records: Vec<RemoteRecord>) -> Self {
        lock(&self.fixed).insert(kind, records);
        self
    }

    /// Queue one response for `kind`.
    #[must_use]
    pub fn then(self, kind: EntityKind, response: Result<RemotePage, RemoteError>) -> Self {
        lock(&self.scripts)
            .entry(kind)
            .or_default()
            .push_back(response);
        self
    }

    /// Sleep for `delay` before answering each fetch.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `fetch_page` calls made for `kind`.
    #[must_use]
    pub fn calls(&self, kind: EntityKind) -> u32 {
        lock(&self.calls).get(&kind).copied().unwrap_or(0)
    }

    /// Cursors passed to `fetch_page` for `kind`, in call order.
    #[must_use]
    pub fn cursors(&self, kind: EntityKind) -> Vec<Option<String>> {
        lock(&self.cursors)
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, c)| c.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteSource for ScriptedRemote {
    async fn fetch_page(
        &self,
        kind: EntityKind,
        cursor: Option<String>,
        _page_size: i64,
    ) -> Result<RemotePage, RemoteError> {
        *lock(&self.calls).entry(kind).or_default() += 1;
        lock(&self.cursors).push((kind, cursor));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(response) = lock(&self.scripts)
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }

        let records = lock(&self.fixed).get(&kind).cloned().unwrap_or_default();
        Ok(RemotePage::last(records))
    }
}

// =============================================================================
// Store
// =============================================================================

/// In-memory local store keyed by `(kind, shopify_id)`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<(EntityKind, String), LocalRecord>>,
    rejected: Mutex<HashSet<String>>,
    upserts: Mutex<Vec<(EntityKind, String)>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject upserts of `shopify_id` with a constraint violation.
    #[must_use]
    pub fn rejecting(self, shopify_id: &str) -> Self {
        lock(&self.rejected).insert(shopify_id.to_string());
        self
    }

    /// Stored record, if any.
    #[must_use]
    pub fn get(&self, kind: EntityKind, shopify_id: &str) -> Option<LocalRecord> {
        lock(&self.rows)
            .get(&(kind, shopify_id.to_string()))
            .cloned()
    }

    /// Every upsert attempt that reached the store, in order.
    #[must_use]
    pub fn upserts(&self) -> Vec<(EntityKind, String)> {
        lock(&self.upserts).clone()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn upsert(&self, record: &LocalRecord) -> Result<u64, StoreError> {
        let key = (record.kind(), record.shopify_id().to_string());
        lock(&self.upserts).push(key.clone());

        if lock(&self.rejected).contains(record.shopify_id()) {
            return Err(StoreError::ConstraintViolation(format!(
                "duplicate key value violates unique constraint ({})",
                record.shopify_id()
            )));
        }

        lock(&self.rows).insert(key, record.clone());
        Ok(1)
    }

    async fn count(&self, kind: EntityKind) -> Result<i64, StoreError> {
        let count = lock(&self.rows).keys().filter(|(k, _)| *k == kind).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

// =============================================================================
// Activity log
// =============================================================================

/// In-memory append-only activity log.
#[derive(Debug, Default)]
pub struct MemoryActivityLog {
    entries: Mutex<Vec<ActivityLogEntry>>,
    next_id: AtomicI64,
    failing: AtomicBool,
}

impl MemoryActivityLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose writes always fail.
    #[must_use]
    pub fn failing() -> Self {
        let log = Self::default();
        log.failing.store(true, Ordering::SeqCst);
        log
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<ActivityLogEntry> {
        lock(&self.entries).clone()
    }

    /// Insert an entry with an explicit timestamp.
    pub fn insert_at(&self, entry: NewActivityLogEntry, created_at: DateTime<Utc>) -> ActivityLogEntry {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = ActivityLogEntry {
            id: ActivityLogId::new(id),
            actor_id: entry.actor_id,
            action: entry.action,
            entity_kind: entry.entity_kind,
            entity_id: entry.entity_id,
            description: entry.description,
            metadata: entry.metadata,
            outcome: entry.outcome,
            error_message: entry.error_message,
            duration_ms: entry.duration_ms,
            created_at,
        };
        lock(&self.entries).push(stored.clone());
        stored
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn append(&self, entry: NewActivityLogEntry) -> Result<ActivityLogEntry, RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.insert_at(entry, Utc::now()))
    }

    async fn query(
        &self,
        filter: &ActivityLogFilter,
    ) -> Result<Vec<ActivityLogEntry>, RepositoryError> {
        let mut matching: Vec<ActivityLogEntry> = lock(&self.entries)
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| i64::from(b.id).cmp(&i64::from(a.id)))
        });
        matching.truncate(usize::try_from(filter.effective_limit()).unwrap_or(usize::MAX));
        Ok(matching)
    }

    async fn statistics(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ActivityStatistics, RepositoryError> {
        let entries = lock(&self.entries);
        Ok(ActivityStatistics::from_entries(
            entries
                .iter()
                .filter(|e| ActivityStatistics::in_window(e.created_at, from, to)),
        ))
    }
}

// =============================================================================
// Records
// =============================================================================

/// A valid remote product.
#[must_use]
pub fn product(id: &str) -> RemoteRecord {
    RemoteRecord::Product(RemoteProduct {
        id: id.to_string(),
        handle: Some(format!("deck-{id}")),
        title: Some(format!("Deck {id}")),
        description_html: None,
        vendor: Some("Birch Works".to_string()),
        product_type: Some("Deck".to_string()),
        status: Some("ACTIVE".to_string()),
        tags: vec!["deck".to_string()],
        total_inventory: Some(10),
        min_price: Some(Money {
            amount: "64.00".to_string(),
            currency_code: "USD".to_string(),
        }),
        created_at: Some("2026-02-01T12:00:00Z".to_string()),
        updated_at: Some("2026-02-10T12:00:00Z".to_string()),
    })
}

/// A remote product missing its required title.
#[must_use]
pub fn untitled_product(id: &str) -> RemoteRecord {
    let RemoteRecord::Product(mut p) = product(id) else {
        unreachable!("product() builds a product");
    };
    p.title = None;
    RemoteRecord::Product(p)
}

/// A valid remote collection.
#[must_use]
pub fn collection(id: &str) -> RemoteRecord {
    RemoteRecord::Collection(RemoteCollection {
        id: id.to_string(),
        handle: Some(format!("collection-{id}")),
        title: Some(format!("Collection {id}")),
        description_html: None,
        sort_order: Some("BEST_SELLING".to_string()),
        products_count: Some(4),
        updated_at: None,
    })
}

/// A valid remote customer.
#[must_use]
pub fn customer(id: &str) -> RemoteRecord {
    RemoteRecord::Customer(RemoteCustomer {
        id: id.to_string(),
        email: Some(format!("{id}@riders.example")),
        first_name: Some("Rider".to_string()),
        last_name: None,
        phone: None,
        state: Some("ENABLED".to_string()),
        tags: vec![],
        orders_count: Some(1),
        amount_spent: None,
        created_at: None,
        updated_at: None,
    })
}

/// A valid remote guest order.
#[must_use]
pub fn order(id: &str) -> RemoteRecord {
    RemoteRecord::Order(RemoteOrder {
        id: id.to_string(),
        name: Some(format!("#{id}")),
        email: None,
        customer_id: None,
        financial_status: Some("PAID".to_string()),
        fulfillment_status: None,
        total_price: Some(Money {
            amount: "89.50".to_string(),
            currency_code: "USD".to_string(),
        }),
        processed_at: Some("2026-02-11T09:00:00Z".to_string()),
        cancelled_at: None,
        created_at: None,
        updated_at: None,
    })
}

/// A valid remote promotion.
#[must_use]
pub fn promotion(id: &str) -> RemoteRecord {
    RemoteRecord::Promotion(RemotePromotion {
        id: id.to_string(),
        discount_type: "DiscountCodeBasic".to_string(),
        title: Some(format!("Promo {id}")),
        code: Some(id.to_uppercase()),
        status: Some("ACTIVE".to_string()),
        summary: Some("10% off decks".to_string()),
        starts_at: Some("2026-03-01T00:00:00Z".to_string()),
        ends_at: None,
        usage_limit: None,
        usage_count: Some(0),
    })
}

/// A valid record of `kind`.
#[must_use]
pub fn record_for(kind: EntityKind, id: &str) -> RemoteRecord {
    match kind {
        EntityKind::Product => product(id),
        EntityKind::Collection => collection(id),
        EntityKind::Customer => customer(id),
        EntityKind::Order => order(id),
        EntityKind::Promotion => promotion(id),
    }
}

/// A non-final page.
#[must_use]
pub fn page(records: Vec<RemoteRecord>, next_cursor: &str) -> RemotePage {
    RemotePage {
        records,
        has_more: true,
        next_cursor: Some(next_cursor.to_string()),
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// Sync settings with a 1ms initial backoff.
#[must_use]
pub fn fast_sync_config() -> SyncConfig {
    SyncConfig {
        page_size: 50,
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
    }
}

/// Orchestrator over in-memory seams.
#[must_use]
pub fn sync_service(
    remote: Arc<ScriptedRemote>,
    store: Arc<MemoryStore>,
    log: Arc<MemoryActivityLog>,
) -> SyncService {
    SyncService::new(remote, store, ActivityLogger::new(log), &fast_sync_config())
}

/// Admin configuration for tests. Nothing here is ever dialed.
///
/// # Panics
///
/// Never; the static URL always parses.
#[must_use]
pub fn test_config() -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from("postgres://localhost/skateshop_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3001,
        base_url: "http://127.0.0.1:3001".to_string(),
        session_secret: SecretString::from("x7Kp2mQ9vR4tW8yB3nF6hJ1cL5dG0sZ!"),
        credentials: AdminCredentials {
            username: TEST_USERNAME.to_string(),
            password: SecretString::from(TEST_PASSWORD),
        },
        shopify: ShopifyAdminConfig {
            store: "skate-test.myshopify.com".to_string(),
            api_url: url::Url::parse("http://127.0.0.1:9").expect("static URL"),
            api_version: "2026-01".to_string(),
            access_token: SecretString::from("shpat_test_token"),
        },
        sync: fast_sync_config(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Application state over in-memory seams and a lazily-connecting pool.
///
/// # Panics
///
/// Panics if the static database URL fails to parse.
#[must_use]
pub fn test_state(sync: SyncService, log: Arc<MemoryActivityLog>) -> AppState {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://localhost/skateshop_test")
        .expect("valid database URL");

    AppState::from_parts(test_config(), pool, sync, ActivityLogger::new(log))
}

/// The full admin router with an in-memory session store.
#[must_use]
pub fn test_app(state: AppState) -> axum::Router {
    let sessions = session_layer_with_store(tower_sessions::MemoryStore::default(), false);
    routes::app(state, sessions)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
