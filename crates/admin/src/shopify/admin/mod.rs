//! Shopify Admin API GraphQL client.
//!
//! This module provides a type-safe client for reading the entity kinds the
//! admin mirrors locally. Authentication uses a private-app access token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use graphql_client::GraphQLQuery;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use skateshop_core::EntityKind;
use tracing::instrument;

use crate::config::ShopifyAdminConfig;
use crate::sync::{RemoteError, RemoteSource};

use super::{AdminShopifyError, GraphQLError, types::RemotePage};

mod conversions;
pub mod queries;

use conversions::{
    convert_collection_connection, convert_customer_connection, convert_discount_connection,
    convert_order_connection, convert_product_connection,
};
use queries::{GetCollections, GetCustomers, GetDiscountNodes, GetOrders, GetProducts, PageVariables};

/// Default `Retry-After` when Shopify omits the header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Security
///
/// This client carries an access token with HIGH PRIVILEGE access to the
/// store.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    store: String,
    endpoint: String,
    access_token: SecretString,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("store", &self.inner.store)
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
    #[serde(default)]
    extensions: Option<GraphQLErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorExtensions {
    code: Option<String>,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Shopify Admin API configuration
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Http` if the HTTP client cannot be built
    /// (for example, no TLS backend is available).
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, AdminShopifyError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("skateshop-admin/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                store: config.store.clone(),
                endpoint: config.graphql_endpoint(),
                access_token: config.access_token.clone(),
            }),
        })
    }

    /// Get the store domain.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    /// Get the GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, AdminShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map_or(DEFAULT_RETRY_AFTER_SECS, retry_after_secs);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for rejected credentials
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AdminShopifyError::Unauthorized(format!(
                "Shopify rejected the access token (HTTP {})",
                status.as_u16()
            )));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdminShopifyError::Status {
                status: status.as_u16(),
                body: truncate(&text, 500),
            });
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse<Q::ResponseData> = serde_json::from_slice(&bytes)?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    code: e.extensions.and_then(|x| x.code),
                    path: e.path,
                })
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            AdminShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                code: None,
                path: vec![],
            }])
        })
    }

    // =========================================================================
    // List queries
    // =========================================================================

    /// Get one page of records for an entity kind.
    ///
    /// # Arguments
    ///
    /// * `kind` - Entity kind to list
    /// * `after` - Cursor returned by the previous page (`None` for the first page)
    /// * `first` - Page size
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn list_page(
        &self,
        kind: EntityKind,
        after: Option<String>,
        first: i64,
    ) -> Result<RemotePage, AdminShopifyError> {
        let variables = PageVariables { first, after };

        let page = match kind {
            EntityKind::Product => {
                let response = self.execute::<GetProducts>(variables).await?;
                convert_product_connection(response.products)
            }
            EntityKind::Collection => {
                let response = self.execute::<GetCollections>(variables).await?;
                convert_collection_connection(response.collections)
            }
            EntityKind::Customer => {
                let response = self.execute::<GetCustomers>(variables).await?;
                convert_customer_connection(response.customers)
            }
            EntityKind::Order => {
                let response = self.execute::<GetOrders>(variables).await?;
                convert_order_connection(response.orders)
            }
            EntityKind::Promotion => {
                let response = self.execute::<GetDiscountNodes>(variables).await?;
                convert_discount_connection(response.discount_nodes)
            }
        };

        tracing::debug!(
            records = page.records.len(),
            has_more = page.has_more,
            "Fetched Shopify page"
        );

        Ok(page)
    }
}

#[async_trait]
impl RemoteSource for AdminClient {
    async fn fetch_page(
        &self,
        kind: EntityKind,
        cursor: Option<String>,
        page_size: i64,
    ) -> Result<RemotePage, RemoteError> {
        self.list_page(kind, cursor, page_size)
            .await
            .map_err(RemoteError::from)
    }
}

/// Round a `Retry-After` header value up to whole seconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn retry_after_secs(secs: f64) -> u64 {
    secs.clamp(0.0, 3600.0).ceil() as u64
}

/// Truncate an error body on a character boundary.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use url::Url;

    #[test]
    fn test_client_debug_hides_token() {
        let config = ShopifyAdminConfig {
            store: "deck-shop.myshopify.com".to_string(),
            api_url: Url::parse("https://deck-shop.myshopify.com").unwrap(),
            api_version: "2026-01".to_string(),
            access_token: SecretString::from("shpat_do_not_print"),
        };
        let client = AdminClient::new(&config).unwrap();

        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("deck-shop.myshopify.com"));
        assert!(!debug_output.contains("shpat_do_not_print"));
        assert_eq!(
            client.endpoint(),
            "https://deck-shop.myshopify.com/admin/api/2026-01/graphql.json"
        );
    }

    /// Serve one response that promises more body than it sends, then hang up.
    async fn truncated_body_server() -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 512\r\n\r\n{\"data\":")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn request_complete(request: &[u8]) -> bool {
        let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= end + 4 + length
    }

    #[tokio::test]
    async fn test_body_cut_off_mid_read_is_transient() {
        let config = ShopifyAdminConfig {
            store: "deck-shop.myshopify.com".to_string(),
            api_url: truncated_body_server().await,
            api_version: "2026-01".to_string(),
            access_token: SecretString::from("shpat_test"),
        };
        let client = AdminClient::new(&config).unwrap();

        let err = client
            .fetch_page(EntityKind::Product, None, 10)
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::TransientNetwork(_)), "got {err:?}");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(2.0), 2);
        assert_eq!(retry_after_secs(0.4), 1);
        assert_eq!(retry_after_secs(-5.0), 0);
    }
}
