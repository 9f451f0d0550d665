//! GraphQL query definitions for the Shopify Admin API.
//!
//! Each query lives in its own module laid out the way `graphql_client`
//! codegen lays them out (`QUERY`, `OPERATION_NAME`, `Variables`,
//! `ResponseData`), with a unit struct implementing [`GraphQLQuery`].
//!
//! No copy of the Shopify Admin schema is checked in, so these impls are
//! written by hand instead of with `#[derive(GraphQLQuery)]`. Only the list
//! queries used by synchronization are defined.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared response shapes
// =============================================================================

/// Variables shared by every paginated list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageVariables {
    pub first: i64,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A connection using the `nodes` shorthand.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub page_info: PageInfo,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyBag {
    pub shop_money: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Count {
    pub count: i64,
}

macro_rules! list_query {
    ($name:ident, $module:ident) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = PageVariables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

// =============================================================================
// Products
// =============================================================================

list_query!(GetProducts, get_products);

pub mod get_products {
    use serde::Deserialize;

    use super::{Connection, MoneyV2};

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = r"
query GetProducts($first: Int!, $after: String) {
  products(first: $first, after: $after, sortKey: ID) {
    pageInfo { hasNextPage endCursor }
    nodes {
      id
      handle
      title
      descriptionHtml
      vendor
      productType
      status
      tags
      totalInventory
      createdAt
      updatedAt
      priceRangeV2 { minVariantPrice { amount currencyCode } }
    }
  }
}
";

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductNode {
        pub id: String,
        pub handle: Option<String>,
        pub title: Option<String>,
        pub description_html: Option<String>,
        pub vendor: Option<String>,
        pub product_type: Option<String>,
        pub status: Option<String>,
        #[serde(default)]
        pub tags: Vec<String>,
        pub total_inventory: Option<i64>,
        pub created_at: Option<String>,
        pub updated_at: Option<String>,
        pub price_range_v2: Option<PriceRange>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceRange {
        pub min_variant_price: MoneyV2,
    }
}

// =============================================================================
// Collections
// =============================================================================

list_query!(GetCollections, get_collections);

pub mod get_collections {
    use serde::Deserialize;

    use super::{Connection, Count};

    pub const OPERATION_NAME: &str = "GetCollections";
    pub const QUERY: &str = r"
query GetCollections($first: Int!, $after: String) {
  collections(first: $first, after: $after, sortKey: ID) {
    pageInfo { hasNextPage endCursor }
    nodes {
      id
      handle
      title
      descriptionHtml
      sortOrder
      updatedAt
      productsCount { count }
    }
  }
}
";

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collections: Connection<CollectionNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CollectionNode {
        pub id: String,
        pub handle: Option<String>,
        pub title: Option<String>,
        pub description_html: Option<String>,
        pub sort_order: Option<String>,
        pub updated_at: Option<String>,
        pub products_count: Option<Count>,
    }
}

// =============================================================================
// Customers
// =============================================================================

list_query!(GetCustomers, get_customers);

pub mod get_customers {
    use serde::Deserialize;

    use super::{Connection, MoneyV2};

    pub const OPERATION_NAME: &str = "GetCustomers";
    pub const QUERY: &str = r"
query GetCustomers($first: Int!, $after: String) {
  customers(first: $first, after: $after, sortKey: ID) {
    pageInfo { hasNextPage endCursor }
    nodes {
      id
      firstName
      lastName
      state
      tags
      numberOfOrders
      createdAt
      updatedAt
      defaultEmailAddress { emailAddress }
      defaultPhoneNumber { phoneNumber }
      amountSpent { amount currencyCode }
    }
  }
}
";

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub customers: Connection<CustomerNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerNode {
        pub id: String,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub state: Option<String>,
        #[serde(default)]
        pub tags: Vec<String>,
        /// Shopify serializes `UnsignedInt64` as a string.
        pub number_of_orders: Option<String>,
        pub created_at: Option<String>,
        pub updated_at: Option<String>,
        pub default_email_address: Option<EmailAddress>,
        pub default_phone_number: Option<PhoneNumber>,
        pub amount_spent: Option<MoneyV2>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EmailAddress {
        pub email_address: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PhoneNumber {
        pub phone_number: Option<String>,
    }
}

// =============================================================================
// Orders
// =============================================================================

list_query!(GetOrders, get_orders);

pub mod get_orders {
    use serde::Deserialize;

    use super::{Connection, MoneyBag};

    pub const OPERATION_NAME: &str = "GetOrders";
    pub const QUERY: &str = r"
query GetOrders($first: Int!, $after: String) {
  orders(first: $first, after: $after, sortKey: ID) {
    pageInfo { hasNextPage endCursor }
    nodes {
      id
      name
      email
      displayFinancialStatus
      displayFulfillmentStatus
      processedAt
      cancelledAt
      createdAt
      updatedAt
      customer { id }
      currentTotalPriceSet { shopMoney { amount currencyCode } }
    }
  }
}
";

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub orders: Connection<OrderNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderNode {
        pub id: String,
        pub name: Option<String>,
        pub email: Option<String>,
        pub display_financial_status: Option<String>,
        pub display_fulfillment_status: Option<String>,
        pub processed_at: Option<String>,
        pub cancelled_at: Option<String>,
        pub created_at: Option<String>,
        pub updated_at: Option<String>,
        pub customer: Option<CustomerRef>,
        pub current_total_price_set: Option<MoneyBag>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CustomerRef {
        pub id: String,
    }
}

// =============================================================================
// Promotions (discount nodes)
// =============================================================================

list_query!(GetDiscountNodes, get_discount_nodes);

pub mod get_discount_nodes {
    use serde::Deserialize;

    use super::Connection;

    pub const OPERATION_NAME: &str = "GetDiscountNodes";
    pub const QUERY: &str = r"
query GetDiscountNodes($first: Int!, $after: String) {
  discountNodes(first: $first, after: $after, sortKey: ID) {
    pageInfo { hasNextPage endCursor }
    nodes {
      id
      discount {
        __typename
        ... on DiscountCodeBasic { ...CodeDiscountFields }
        ... on DiscountCodeBxgy { ...CodeDiscountFields }
        ... on DiscountCodeFreeShipping { ...CodeDiscountFields }
        ... on DiscountAutomaticBasic { title status summary startsAt endsAt asyncUsageCount }
        ... on DiscountAutomaticBxgy { title status summary startsAt endsAt asyncUsageCount }
        ... on DiscountAutomaticFreeShipping { title status summary startsAt endsAt asyncUsageCount }
      }
    }
  }
}

fragment CodeDiscountFields on DiscountCode {
  title
  status
  summary
  startsAt
  endsAt
  usageLimit
  asyncUsageCount
  codes(first: 1) { nodes { code } }
}
";

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub discount_nodes: Connection<DiscountNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DiscountNode {
        pub id: String,
        pub discount: DiscountFields,
    }

    /// Fields shared by every discount variant; absent ones stay `None`.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DiscountFields {
        #[serde(rename = "__typename")]
        pub typename: String,
        pub title: Option<String>,
        pub status: Option<String>,
        pub summary: Option<String>,
        pub starts_at: Option<String>,
        pub ends_at: Option<String>,
        pub usage_limit: Option<i64>,
        pub async_usage_count: Option<i64>,
        pub codes: Option<CodeConnection>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CodeConnection {
        #[serde(default)]
        pub nodes: Vec<CodeNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CodeNode {
        pub code: String,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_uses_operation_name() {
        let body = GetProducts::build_query(PageVariables {
            first: 25,
            after: Some("cursor-1".to_string()),
        });
        assert_eq!(body.operation_name, "GetProducts");
        assert!(body.query.contains("products(first: $first, after: $after"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["first"], 25);
        assert_eq!(json["variables"]["after"], "cursor-1");
        assert_eq!(json["operationName"], "GetProducts");
    }

    #[test]
    fn test_first_page_sends_null_cursor() {
        let body = GetOrders::build_query(PageVariables {
            first: 10,
            after: None,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["variables"]["after"].is_null());
    }

    #[test]
    fn test_discount_response_deserializes_automatic_discount() {
        let payload = serde_json::json!({
            "discountNodes": {
                "pageInfo": { "hasNextPage": false, "endCursor": null },
                "nodes": [{
                    "id": "gid://shopify/DiscountAutomaticNode/1",
                    "discount": {
                        "__typename": "DiscountAutomaticBasic",
                        "title": "Summer deck sale",
                        "status": "ACTIVE",
                        "summary": "10% off decks",
                        "startsAt": "2026-06-01T00:00:00Z",
                        "endsAt": null,
                        "asyncUsageCount": 12
                    }
                }]
            }
        });

        let data: get_discount_nodes::ResponseData = serde_json::from_value(payload).unwrap();
        let node = &data.discount_nodes.nodes[0];
        assert_eq!(node.discount.typename, "DiscountAutomaticBasic");
        assert!(node.discount.codes.is_none());
        assert_eq!(node.discount.async_usage_count, Some(12));
    }
}
