//! Promotion (discount node) conversion functions.

use crate::shopify::types::{RemotePage, RemotePromotion, RemoteRecord};

use super::super::queries::{Connection, get_discount_nodes};
use super::convert_page_info;

pub fn convert_discount_connection(
    conn: Connection<get_discount_nodes::DiscountNode>,
) -> RemotePage {
    let records = conn
        .nodes
        .into_iter()
        .map(|node| RemoteRecord::Promotion(convert_discount(node)))
        .collect();

    RemotePage::from_page_info(records, convert_page_info(conn.page_info))
}

fn convert_discount(node: get_discount_nodes::DiscountNode) -> RemotePromotion {
    let discount = node.discount;
    let code = discount
        .codes
        .and_then(|codes| codes.nodes.into_iter().next())
        .map(|c| c.code);

    RemotePromotion {
        id: node.id,
        discount_type: discount.typename,
        title: discount.title,
        code,
        status: discount.status,
        summary: discount.summary,
        starts_at: discount.starts_at,
        ends_at: discount.ends_at,
        usage_limit: discount.usage_limit,
        usage_count: discount.async_usage_count,
    }
}
