//! Customer type conversion functions.

use crate::shopify::types::{RemoteCustomer, RemotePage, RemoteRecord};

use super::super::queries::{Connection, get_customers};
use super::{convert_money, convert_page_info};

pub fn convert_customer_connection(conn: Connection<get_customers::CustomerNode>) -> RemotePage {
    let records = conn
        .nodes
        .into_iter()
        .map(|node| RemoteRecord::Customer(convert_customer(node)))
        .collect();

    RemotePage::from_page_info(records, convert_page_info(conn.page_info))
}

fn convert_customer(node: get_customers::CustomerNode) -> RemoteCustomer {
    RemoteCustomer {
        id: node.id,
        email: node.default_email_address.and_then(|e| e.email_address),
        first_name: node.first_name,
        last_name: node.last_name,
        phone: node.default_phone_number.and_then(|p| p.phone_number),
        state: node.state,
        tags: node.tags,
        // UnsignedInt64 arrives as a string; an unparsable count is dropped
        orders_count: node.number_of_orders.and_then(|n| n.parse().ok()),
        amount_spent: node.amount_spent.map(convert_money),
        created_at: node.created_at,
        updated_at: node.updated_at,
    }
}
