//! Mapping from remote DTOs to local rows.
//!
//! Mapping fails closed: a missing required field or a value that does not
//! parse rejects the record with [`StoreError::ConstraintViolation`] instead
//! of writing a partially-populated row.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{
    LocalCollection, LocalCustomer, LocalOrder, LocalProduct, LocalPromotion, LocalRecord,
};
use crate::shopify::{
    Money, RemoteCollection, RemoteCustomer, RemoteOrder, RemoteProduct, RemotePromotion,
    RemoteRecord,
};

use super::StoreError;

/// Map a remote record into its local row.
///
/// # Errors
///
/// Returns `StoreError::ConstraintViolation` naming the record and field when
/// a required value is missing or malformed.
pub fn map_record(record: RemoteRecord) -> Result<LocalRecord, StoreError> {
    match record {
        RemoteRecord::Product(r) => map_product(r).map(LocalRecord::Product),
        RemoteRecord::Collection(r) => map_collection(r).map(LocalRecord::Collection),
        RemoteRecord::Customer(r) => map_customer(r).map(LocalRecord::Customer),
        RemoteRecord::Order(r) => map_order(r).map(LocalRecord::Order),
        RemoteRecord::Promotion(r) => map_promotion(r).map(LocalRecord::Promotion),
    }
}

fn map_product(r: RemoteProduct) -> Result<LocalProduct, StoreError> {
    let (min_price, currency_code) = optional_money(&r.id, "min_price", r.min_price)?;

    Ok(LocalProduct {
        handle: required(&r.id, "handle", r.handle)?,
        title: required(&r.id, "title", r.title)?,
        shopify_created_at: optional_timestamp(&r.id, "created_at", r.created_at.as_deref())?,
        shopify_updated_at: optional_timestamp(&r.id, "updated_at", r.updated_at.as_deref())?,
        description_html: non_empty(r.description_html),
        vendor: non_empty(r.vendor),
        product_type: non_empty(r.product_type),
        status: r.status,
        tags: r.tags,
        total_inventory: r.total_inventory,
        min_price,
        currency_code,
        shopify_id: r.id,
    })
}

fn map_collection(r: RemoteCollection) -> Result<LocalCollection, StoreError> {
    Ok(LocalCollection {
        handle: required(&r.id, "handle", r.handle)?,
        title: required(&r.id, "title", r.title)?,
        shopify_updated_at: optional_timestamp(&r.id, "updated_at", r.updated_at.as_deref())?,
        description_html: non_empty(r.description_html),
        sort_order: r.sort_order,
        products_count: r.products_count,
        shopify_id: r.id,
    })
}

fn map_customer(r: RemoteCustomer) -> Result<LocalCustomer, StoreError> {
    let (amount_spent, currency_code) = optional_money(&r.id, "amount_spent", r.amount_spent)?;

    Ok(LocalCustomer {
        email: non_empty(r.email).map(|e| e.to_lowercase()),
        shopify_created_at: optional_timestamp(&r.id, "created_at", r.created_at.as_deref())?,
        shopify_updated_at: optional_timestamp(&r.id, "updated_at", r.updated_at.as_deref())?,
        first_name: non_empty(r.first_name),
        last_name: non_empty(r.last_name),
        phone: non_empty(r.phone),
        state: r.state,
        tags: r.tags,
        orders_count: r.orders_count,
        amount_spent,
        currency_code,
        shopify_id: r.id,
    })
}

fn map_order(r: RemoteOrder) -> Result<LocalOrder, StoreError> {
    let total = required(&r.id, "total_price", r.total_price)?;
    let total_price = decimal(&r.id, "total_price", &total.amount)?;
    let currency_code = required(&r.id, "currency_code", non_empty(Some(total.currency_code)))?;

    Ok(LocalOrder {
        name: required(&r.id, "name", r.name)?,
        processed_at: optional_timestamp(&r.id, "processed_at", r.processed_at.as_deref())?,
        cancelled_at: optional_timestamp(&r.id, "cancelled_at", r.cancelled_at.as_deref())?,
        shopify_created_at: optional_timestamp(&r.id, "created_at", r.created_at.as_deref())?,
        shopify_updated_at: optional_timestamp(&r.id, "updated_at", r.updated_at.as_deref())?,
        email: non_empty(r.email),
        customer_shopify_id: r.customer_id,
        financial_status: r.financial_status,
        fulfillment_status: r.fulfillment_status,
        total_price,
        currency_code,
        shopify_id: r.id,
    })
}

fn map_promotion(r: RemotePromotion) -> Result<LocalPromotion, StoreError> {
    let starts_at = required(&r.id, "starts_at", r.starts_at)?;

    Ok(LocalPromotion {
        title: required(&r.id, "title", r.title)?,
        status: required(&r.id, "status", r.status)?,
        starts_at: timestamp(&r.id, "starts_at", &starts_at)?,
        ends_at: optional_timestamp(&r.id, "ends_at", r.ends_at.as_deref())?,
        discount_type: r.discount_type,
        code: non_empty(r.code),
        summary: non_empty(r.summary),
        usage_limit: r.usage_limit,
        usage_count: r.usage_count,
        shopify_id: r.id,
    })
}

// =============================================================================
// Field helpers
// =============================================================================

fn violation(id: &str, field: &str, problem: &str) -> StoreError {
    StoreError::ConstraintViolation(format!("{id}: {field} {problem}"))
}

/// Blank strings count as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn required<T: RequiredValue>(id: &str, field: &str, value: Option<T>) -> Result<T, StoreError> {
    value
        .filter(T::is_present)
        .ok_or_else(|| violation(id, field, "is required"))
}

/// Values that may be present but still count as missing.
trait RequiredValue {
    fn is_present(&self) -> bool;
}

impl RequiredValue for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl RequiredValue for Money {
    fn is_present(&self) -> bool {
        !self.amount.trim().is_empty()
    }
}

fn decimal(id: &str, field: &str, value: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(value.trim()).map_err(|_| violation(id, field, "is not a decimal amount"))
}

fn optional_money(
    id: &str,
    field: &str,
    money: Option<Money>,
) -> Result<(Option<Decimal>, Option<String>), StoreError> {
    match money {
        Some(m) => Ok((
            Some(decimal(id, field, &m.amount)?),
            non_empty(Some(m.currency_code)),
        )),
        None => Ok((None, None)),
    }
}

fn timestamp(id: &str, field: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| violation(id, field, "is not an RFC 3339 timestamp"))
}

fn optional_timestamp(
    id: &str,
    field: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    value.map(|v| timestamp(id, field, v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> RemoteProduct {
        RemoteProduct {
            id: id.to_string(),
            handle: Some("cruiser-deck".to_string()),
            title: Some("Cruiser Deck".to_string()),
            description_html: Some(String::new()),
            vendor: Some("Birch Works".to_string()),
            product_type: None,
            status: Some("ACTIVE".to_string()),
            tags: vec!["deck".to_string()],
            total_inventory: Some(12),
            min_price: Some(Money {
                amount: "59.95".to_string(),
                currency_code: "USD".to_string(),
            }),
            created_at: Some("2026-03-01T10:00:00Z".to_string()),
            updated_at: None,
        }
    }

    fn order(id: &str) -> RemoteOrder {
        RemoteOrder {
            id: id.to_string(),
            name: Some("#1001".to_string()),
            email: Some("rider@example.com".to_string()),
            customer_id: None,
            financial_status: Some("PAID".to_string()),
            fulfillment_status: None,
            total_price: Some(Money {
                amount: "120.00".to_string(),
                currency_code: "USD".to_string(),
            }),
            processed_at: Some("2026-03-02T08:30:00-05:00".to_string()),
            cancelled_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_product_maps_typed_fields() {
        let LocalRecord::Product(p) = map_record(RemoteRecord::Product(product("p1"))).unwrap()
        else {
            panic!("expected product");
        };

        assert_eq!(p.shopify_id, "p1");
        assert_eq!(p.min_price, Some(Decimal::new(5995, 2)));
        assert_eq!(p.currency_code.as_deref(), Some("USD"));
        assert_eq!(p.description_html, None);
        assert!(p.shopify_created_at.is_some());
    }

    #[test]
    fn test_product_without_title_is_rejected() {
        let mut remote = product("p2");
        remote.title = Some("   ".to_string());

        let err = map_record(RemoteRecord::Product(remote)).unwrap_err();
        assert_eq!(
            err,
            StoreError::ConstraintViolation("p2: title is required".to_string())
        );
    }

    #[test]
    fn test_order_timestamps_normalize_to_utc() {
        let LocalRecord::Order(o) = map_record(RemoteRecord::Order(order("o1"))).unwrap() else {
            panic!("expected order");
        };

        assert_eq!(o.total_price, Decimal::new(12000, 2));
        assert_eq!(
            o.processed_at.map(|t| t.to_rfc3339()),
            Some("2026-03-02T13:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_order_with_bad_amount_is_rejected() {
        let mut remote = order("o2");
        remote.total_price = Some(Money {
            amount: "twelve".to_string(),
            currency_code: "USD".to_string(),
        });

        assert!(matches!(
            map_record(RemoteRecord::Order(remote)),
            Err(StoreError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_customer_with_phone_only_is_kept() {
        let remote = RemoteCustomer {
            id: "c1".to_string(),
            email: None,
            first_name: Some("Ada".to_string()),
            last_name: None,
            phone: Some("+15551234567".to_string()),
            state: None,
            tags: vec![],
            orders_count: None,
            amount_spent: None,
            created_at: None,
            updated_at: None,
        };

        let LocalRecord::Customer(c) = map_record(RemoteRecord::Customer(remote)).unwrap() else {
            panic!("expected a customer");
        };
        assert_eq!(c.email, None);
        assert_eq!(c.phone.as_deref(), Some("+15551234567"));
    }

    #[test]
    fn test_customer_email_is_lowercased() {
        let remote = RemoteCustomer {
            id: "c2".to_string(),
            email: Some("Rider@Example.COM".to_string()),
            first_name: None,
            last_name: None,
            phone: None,
            state: None,
            tags: vec![],
            orders_count: None,
            amount_spent: None,
            created_at: None,
            updated_at: None,
        };

        let LocalRecord::Customer(c) = map_record(RemoteRecord::Customer(remote)).unwrap() else {
            panic!("expected a customer");
        };
        assert_eq!(c.email.as_deref(), Some("rider@example.com"));
    }

    #[test]
    fn test_promotion_requires_start() {
        let remote = RemotePromotion {
            id: "d1".to_string(),
            discount_type: "DiscountCodeBasic".to_string(),
            title: Some("Spring 10".to_string()),
            code: Some("SPRING10".to_string()),
            status: Some("ACTIVE".to_string()),
            summary: None,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            usage_count: Some(3),
        };

        let err = map_record(RemoteRecord::Promotion(remote)).unwrap_err();
        assert_eq!(
            err,
            StoreError::ConstraintViolation("d1: starts_at is required".to_string())
        );
    }
}
