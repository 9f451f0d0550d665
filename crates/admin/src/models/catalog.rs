//! Local catalog records mirrored from Shopify.
//!
//! Each record is keyed in the store by a serial primary key plus the unique
//! `shopify_id` used as the upsert conflict target. Values here are already
//! typed and validated, see [`crate::sync::mapping`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use skateshop_core::EntityKind;

/// A product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProduct {
    pub shopify_id: String,
    pub handle: String,
    pub title: String,
    pub description_html: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub total_inventory: Option<i64>,
    pub min_price: Option<Decimal>,
    pub currency_code: Option<String>,
    pub shopify_created_at: Option<DateTime<Utc>>,
    pub shopify_updated_at: Option<DateTime<Utc>>,
}

/// A collection row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCollection {
    pub shopify_id: String,
    pub handle: String,
    pub title: String,
    pub description_html: Option<String>,
    pub sort_order: Option<String>,
    pub products_count: Option<i64>,
    pub shopify_updated_at: Option<DateTime<Utc>>,
}

/// A customer row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCustomer {
    pub shopify_id: String,
    /// Lowercased. Shopify customers may have only a phone number.
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub state: Option<String>,
    pub tags: Vec<String>,
    pub orders_count: Option<i64>,
    pub amount_spent: Option<Decimal>,
    pub currency_code: Option<String>,
    pub shopify_created_at: Option<DateTime<Utc>>,
    pub shopify_updated_at: Option<DateTime<Utc>>,
}

/// An order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOrder {
    pub shopify_id: String,
    /// Display name (e.g., `#1001`).
    pub name: String,
    pub email: Option<String>,
    /// References `customers.shopify_id`; `None` for guest checkouts.
    pub customer_shopify_id: Option<String>,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Decimal,
    pub currency_code: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub shopify_created_at: Option<DateTime<Utc>>,
    pub shopify_updated_at: Option<DateTime<Utc>>,
}

/// A promotion (discount) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPromotion {
    pub shopify_id: String,
    pub discount_type: String,
    pub title: String,
    pub code: Option<String>,
    pub status: String,
    pub summary: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i64>,
    pub usage_count: Option<i64>,
}

/// A local record of any synchronized kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocalRecord {
    Product(LocalProduct),
    Collection(LocalCollection),
    Customer(LocalCustomer),
    Order(LocalOrder),
    Promotion(LocalPromotion),
}

impl LocalRecord {
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

    /// The upsert conflict key.
    #[must_use]
    pub fn shopify_id(&self) -> &str {
        match self {
            Self::Product(r) => &r.shopify_id,
            Self::Collection(r) => &r.shopify_id,
            Self::Customer(r) => &r.shopify_id,
            Self::Order(r) => &r.shopify_id,
            Self::Promotion(r) => &r.shopify_id,
        }
    }
}
