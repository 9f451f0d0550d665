//! Product type conversion functions.

use crate::shopify::types::{RemotePage, RemoteProduct, RemoteRecord};

use super::super::queries::{Connection, get_products};
use super::{convert_money, convert_page_info};

pub fn convert_product_connection(conn: Connection<get_products::ProductNode>) -> RemotePage {
    let records = conn
        .nodes
        .into_iter()
        .map(|node| RemoteRecord::Product(convert_product(node)))
        .collect();

    RemotePage::from_page_info(records, convert_page_info(conn.page_info))
}

fn convert_product(node: get_products::ProductNode) -> RemoteProduct {
    RemoteProduct {
        id: node.id,
        handle: node.handle,
        title: node.title,
        description_html: node.description_html,
        vendor: node.vendor,
        product_type: node.product_type,
        status: node.status,
        tags: node.tags,
        total_inventory: node.total_inventory,
        min_price: node
            .price_range_v2
            .map(|range| convert_money(range.min_variant_price)),
        created_at: node.created_at,
        updated_at: node.updated_at,
    }
}
