//! Local mirror of Shopify catalog, customer, order and promotion data.
//!
//! Every write is a single `INSERT ... ON CONFLICT (shopify_id) DO UPDATE`
//! statement, so re-running a synchronization over unchanged data leaves the
//! row count unchanged. There is no transaction across a batch.

use async_trait::async_trait;
use skateshop_core::EntityKind;
use sqlx::PgPool;
use tracing::instrument;

use crate::models::{
    LocalCollection, LocalCustomer, LocalOrder, LocalProduct, LocalPromotion, LocalRecord,
};
use crate::sync::{LocalStore, StoreError};

use super::RepositoryError;

/// Table holding rows of `kind`.
const fn table_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Product => "admin.products",
        EntityKind::Collection => "admin.collections",
        EntityKind::Customer => "admin.customers",
        EntityKind::Order => "admin.orders",
        EntityKind::Promotion => "admin.promotions",
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the local Shopify mirror.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update a record by its Shopify ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(&self, record: &LocalRecord) -> Result<u64, RepositoryError> {
        match record {
            LocalRecord::Product(p) => self.upsert_product(p).await,
            LocalRecord::Collection(c) => self.upsert_collection(c).await,
            LocalRecord::Customer(c) => self.upsert_customer(c).await,
            LocalRecord::Order(o) => self.upsert_order(o).await,
            LocalRecord::Promotion(p) => self.upsert_promotion(p).await,
        }
    }

    /// Number of rows stored for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, kind: EntityKind) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table_for(kind));
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    async fn upsert_product(&self, p: &LocalProduct) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO admin.products (
                shopify_id, handle, title, description_html, vendor, product_type,
                status, tags, total_inventory, min_price, currency_code,
                shopify_created_at, shopify_updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (shopify_id) DO UPDATE SET
                handle = EXCLUDED.handle,
                title = EXCLUDED.title,
                description_html = EXCLUDED.description_html,
                vendor = EXCLUDED.vendor,
                product_type = EXCLUDED.product_type,
                status = EXCLUDED.status,
                tags = EXCLUDED.tags,
                total_inventory = EXCLUDED.total_inventory,
                min_price = EXCLUDED.min_price,
                currency_code = EXCLUDED.currency_code,
                shopify_created_at = EXCLUDED.shopify_created_at,
                shopify_updated_at = EXCLUDED.shopify_updated_at,
                synced_at = NOW()
            ",
        )
        .bind(&p.shopify_id)
        .bind(&p.handle)
        .bind(&p.title)
        .bind(&p.description_html)
        .bind(&p.vendor)
        .bind(&p.product_type)
        .bind(&p.status)
        .bind(&p.tags)
        .bind(p.total_inventory)
        .bind(p.min_price)
        .bind(&p.currency_code)
        .bind(p.shopify_created_at)
        .bind(p.shopify_updated_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn upsert_collection(&self, c: &LocalCollection) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO admin.collections (
                shopify_id, handle, title, description_html, sort_order,
                products_count, shopify_updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (shopify_id) DO UPDATE SET
                handle = EXCLUDED.handle,
                title = EXCLUDED.title,
                description_html = EXCLUDED.description_html,
                sort_order = EXCLUDED.sort_order,
                products_count = EXCLUDED.products_count,
                shopify_updated_at = EXCLUDED.shopify_updated_at,
                synced_at = NOW()
            ",
        )
        .bind(&c.shopify_id)
        .bind(&c.handle)
        .bind(&c.title)
        .bind(&c.description_html)
        .bind(&c.sort_order)
        .bind(c.products_count)
        .bind(c.shopify_updated_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn upsert_customer(&self, c: &LocalCustomer) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO admin.customers (
                shopify_id, email, first_name, last_name, phone, state, tags,
                orders_count, amount_spent, currency_code,
                shopify_created_at, shopify_updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (shopify_id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                state = EXCLUDED.state,
                tags = EXCLUDED.tags,
                orders_count = EXCLUDED.orders_count,
                amount_spent = EXCLUDED.amount_spent,
                currency_code = EXCLUDED.currency_code,
                shopify_created_at = EXCLUDED.shopify_created_at,
                shopify_updated_at = EXCLUDED.shopify_updated_at,
                synced_at = NOW()
            ",
        )
        .bind(&c.shopify_id)
        .bind(&c.email)
        .bind(&c.first_name)
        .bind(&c.last_name)
        .bind(&c.phone)
        .bind(&c.state)
        .bind(&c.tags)
        .bind(c.orders_count)
        .bind(c.amount_spent)
        .bind(&c.currency_code)
        .bind(c.shopify_created_at)
        .bind(c.shopify_updated_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn upsert_order(&self, o: &LocalOrder) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO admin.orders (
                shopify_id, name, email, customer_shopify_id, financial_status,
                fulfillment_status, total_price, currency_code, processed_at,
                cancelled_at, shopify_created_at, shopify_updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (shopify_id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                customer_shopify_id = EXCLUDED.customer_shopify_id,
                financial_status = EXCLUDED.financial_status,
                fulfillment_status = EXCLUDED.fulfillment_status,
                total_price = EXCLUDED.total_price,
                currency_code = EXCLUDED.currency_code,
                processed_at = EXCLUDED.processed_at,
                cancelled_at = EXCLUDED.cancelled_at,
                shopify_created_at = EXCLUDED.shopify_created_at,
                shopify_updated_at = EXCLUDED.shopify_updated_at,
                synced_at = NOW()
            ",
        )
        .bind(&o.shopify_id)
        .bind(&o.name)
        .bind(&o.email)
        .bind(&o.customer_shopify_id)
        .bind(&o.financial_status)
        .bind(&o.fulfillment_status)
        .bind(o.total_price)
        .bind(&o.currency_code)
        .bind(o.processed_at)
        .bind(o.cancelled_at)
        .bind(o.shopify_created_at)
        .bind(o.shopify_updated_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn upsert_promotion(&self, p: &LocalPromotion) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO admin.promotions (
                shopify_id, discount_type, title, code, status, summary,
                starts_at, ends_at, usage_limit, usage_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (shopify_id) DO UPDATE SET
                discount_type = EXCLUDED.discount_type,
                title = EXCLUDED.title,
                code = EXCLUDED.code,
                status = EXCLUDED.status,
                summary = EXCLUDED.summary,
                starts_at = EXCLUDED.starts_at,
                ends_at = EXCLUDED.ends_at,
                usage_limit = EXCLUDED.usage_limit,
                usage_count = EXCLUDED.usage_count,
                synced_at = NOW()
            ",
        )
        .bind(&p.shopify_id)
        .bind(&p.discount_type)
        .bind(&p.title)
        .bind(&p.code)
        .bind(&p.status)
        .bind(&p.summary)
        .bind(p.starts_at)
        .bind(p.ends_at)
        .bind(p.usage_limit)
        .bind(p.usage_count)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// LocalStore
// =============================================================================

/// [`LocalStore`] backed by the admin `PostgreSQL` pool.
///
/// Each call acquires a pooled connection for a single statement.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => Self::from(e),
            RepositoryError::DataCorruption(msg) => Self::Database(msg),
        }
    }
}

#[async_trait]
impl LocalStore for PgCatalogStore {
    #[instrument(skip(self, record), fields(kind = %record.kind(), shopify_id = %record.shopify_id()))]
    async fn upsert(&self, record: &LocalRecord) -> Result<u64, StoreError> {
        Ok(CatalogRepository::new(&self.pool).upsert(record).await?)
    }

    async fn count(&self, kind: EntityKind) -> Result<i64, StoreError> {
        Ok(CatalogRepository::new(&self.pool).count(kind).await?)
    }
}
