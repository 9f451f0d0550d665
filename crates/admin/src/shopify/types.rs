//! Remote record types for the Shopify Admin API.
//!
//! These are read-only DTOs: field values are kept as Shopify returns them
//! (strings for money and timestamps, options wherever the payload may omit a
//! value). Validation and typing happen when a record is mapped into the
//! local schema, see [`crate::sync::mapping`].

use serde::{Deserialize, Serialize};
use skateshop_core::EntityKind;

// =============================================================================
// Money Types
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

// =============================================================================
// Records
// =============================================================================

/// A product as fetched from Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProduct {
    /// Shopify GID (e.g., `gid://shopify/Product/123`).
    pub id: String,
    pub handle: Option<String>,
    pub title: Option<String>,
    pub description_html: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    /// `ACTIVE`, `DRAFT`, `ARCHIVED` or `UNLISTED`.
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub total_inventory: Option<i64>,
    pub min_price: Option<Money>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A collection as fetched from Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCollection {
    pub id: String,
    pub handle: Option<String>,
    pub title: Option<String>,
    pub description_html: Option<String>,
    pub sort_order: Option<String>,
    pub products_count: Option<i64>,
    pub updated_at: Option<String>,
}

/// A customer as fetched from Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCustomer {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// `ENABLED`, `DISABLED`, `INVITED` or `DECLINED`.
    pub state: Option<String>,
    pub tags: Vec<String>,
    pub orders_count: Option<i64>,
    pub amount_spent: Option<Money>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// An order as fetched from Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: String,
    /// Display name (e.g., `#1001`).
    pub name: Option<String>,
    pub email: Option<String>,
    /// Customer GID, `None` for guest checkouts.
    pub customer_id: Option<String>,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Option<Money>,
    pub processed_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A promotion (Shopify discount) as fetched from Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePromotion {
    /// Discount node GID.
    pub id: String,
    /// GraphQL type name (e.g., `DiscountCodeBasic`, `DiscountAutomaticBxgy`).
    pub discount_type: String,
    pub title: Option<String>,
    /// First redeemable code; `None` for automatic discounts.
    pub code: Option<String>,
    /// `ACTIVE`, `EXPIRED` or `SCHEDULED`.
    pub status: Option<String>,
    pub summary: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub usage_limit: Option<i64>,
    pub usage_count: Option<i64>,
}

/// A record of any synchronized kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteRecord {
    Product(RemoteProduct),
    Collection(RemoteCollection),
    Customer(RemoteCustomer),
    Order(RemoteOrder),
    Promotion(RemotePromotion),
}

impl RemoteRecord {
    /// The entity kind of this record.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Product(_) => EntityKind::Product,
            Self::Collection(_) => EntityKind::Collection,
            Self::Customer(_) => EntityKind::Customer,
            Self::Order(_) => EntityKind::Order,
            Self::Promotion(_) => EntityKind::Promotion,
        }
    }

    /// The Shopify GID identifying this record.
    #[must_use]
    pub fn external_id(&self) -> &str {
        match self {
            Self::Product(r) => &r.id,
            Self::Collection(r) => &r.id,
            Self::Customer(r) => &r.id,
            Self::Order(r) => &r.id,
            Self::Promotion(r) => &r.id,
        }
    }
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

/// One page of records for a single entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePage {
    pub records: Vec<RemoteRecord>,
    pub has_more: bool,
    /// Cursor to pass for the following page.
    pub next_cursor: Option<String>,
}

impl RemotePage {
    /// Final page holding the given records.
    #[must_use]
    pub const fn last(records: Vec<RemoteRecord>) -> Self {
        Self {
            records,
            has_more: false,
            next_cursor: None,
        }
    }

    /// Build a page from records and Shopify's page info.
    #[must_use]
    pub fn from_page_info(records: Vec<RemoteRecord>, page_info: PageInfo) -> Self {
        Self {
            records,
            has_more: page_info.has_next_page,
            next_cursor: page_info.end_cursor,
        }
    }
}
