//! Type conversions from GraphQL response types to remote records.
//!
//! These functions convert the raw query response nodes into the
//! [`RemoteRecord`](crate::shopify::RemoteRecord) DTOs consumed by
//! synchronization. They never reject a node; required-field checks happen
//! during mapping into the local schema.

mod collections;
mod customers;
mod orders;
mod products;
mod promotions;

pub use collections::convert_collection_connection;
pub use customers::convert_customer_connection;
pub use orders::convert_order_connection;
pub use products::convert_product_connection;
pub use promotions::convert_discount_connection;

use crate::shopify::types::{Money, PageInfo};

use super::queries;

/// Convert query page info into the domain page info.
fn convert_page_info(page_info: queries::PageInfo) -> PageInfo {
    PageInfo {
        has_next_page: page_info.has_next_page,
        end_cursor: page_info.end_cursor,
    }
}

/// Convert a `MoneyV2` into domain money.
fn convert_money(money: queries::MoneyV2) -> Money {
    Money {
        amount: money.amount,
        currency_code: money.currency_code,
    }
}
