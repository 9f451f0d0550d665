//! Order type conversion functions.

use crate::shopify::types::{RemoteOrder, RemotePage, RemoteRecord};

use super::super::queries::{Connection, get_orders};
use super::{convert_money, convert_page_info};

pub fn convert_order_connection(conn: Connection<get_orders::OrderNode>) -> RemotePage {
    let records = conn
        .nodes
        .into_iter()
        .map(|node| RemoteRecord::Order(convert_order(node)))
        .collect();

    RemotePage::from_page_info(records, convert_page_info(conn.page_info))
}

fn convert_order(node: get_orders::OrderNode) -> RemoteOrder {
    RemoteOrder {
        id: node.id,
        name: node.name,
        email: node.email,
        customer_id: node.customer.map(|c| c.id),
        financial_status: node.display_financial_status,
        fulfillment_status: node.display_fulfillment_status,
        total_price: node
            .current_total_price_set
            .map(|set| convert_money(set.shop_money)),
        processed_at: node.processed_at,
        cancelled_at: node.cancelled_at,
        created_at: node.created_at,
        updated_at: node.updated_at,
    }
}
