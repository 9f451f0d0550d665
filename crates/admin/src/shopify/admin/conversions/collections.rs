//! Collection type conversion functions.

use crate::shopify::types::{RemoteCollection, RemotePage, RemoteRecord};

use super::super::queries::{Connection, get_collections};
use super::convert_page_info;

pub fn convert_collection_connection(
    conn: Connection<get_collections::CollectionNode>,
) -> RemotePage {
    let records = conn
        .nodes
        .into_iter()
        .map(|node| {
            RemoteRecord::Collection(RemoteCollection {
                id: node.id,
                handle: node.handle,
                title: node.title,
                description_html: node.description_html,
                sort_order: node.sort_order,
                products_count: node.products_count.map(|c| c.count),
                updated_at: node.updated_at,
            })
        })
        .collect();

    RemotePage::from_page_info(records, convert_page_info(conn.page_info))
}
