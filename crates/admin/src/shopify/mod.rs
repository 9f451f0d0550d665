//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the high-privilege Shopify Admin API token.**
//!
//! The token is only ever read here; it is never logged (see the redacting
//! `Debug` on [`crate::config::ShopifyAdminConfig`]).
//!
//! # Architecture
//!
//! - `graphql_client` query bodies over `reqwest`
//! - Read-only list queries for the synchronized entity kinds
//! - Errors are classified into the synchronization taxonomy
//!   ([`crate::sync::RemoteError`]) so the orchestrator can decide between
//!   retrying, failing the kind, or aborting the run
//!
//! # Example
//!
//! ```rust,ignore
//! use skateshop_admin::shopify::AdminClient;
//! use skateshop_admin::sync::RemoteSource;
//! use skateshop_core::EntityKind;
//!
//! let client = AdminClient::new(&config.shopify)?;
//! let page = client.fetch_page(EntityKind::Product, None, 50).await?;
//! ```

mod admin;
pub mod types;

pub use admin::AdminClient;
pub use types::*;

use thiserror::Error;

use crate::sync::RemoteError;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status other than 401/403/429.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// `extensions.code` (e.g., `THROTTLED`, `ACCESS_DENIED`).
    pub code: Option<String>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<AdminShopifyError> for RemoteError {
    fn from(err: AdminShopifyError) -> Self {
        match err {
            AdminShopifyError::Unauthorized(msg) => Self::Authentication(msg),
            AdminShopifyError::RateLimited(retry_after_secs) => {
                Self::RateLimited { retry_after_secs }
            }
            AdminShopifyError::Http(e)
                if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() =>
            {
                Self::TransientNetwork(e.to_string())
            }
            AdminShopifyError::GraphQL(ref errors) => {
                let code = |wanted: &str| errors.iter().any(|e| e.code.as_deref() == Some(wanted));
                if code("THROTTLED") {
                    Self::RateLimited {
                        retry_after_secs: 1,
                    }
                } else if code("ACCESS_DENIED") {
                    Self::Authentication(err.to_string())
                } else {
                    Self::Protocol(err.to_string())
                }
            }
            other => Self::Protocol(other.to_string()),
        }
    }
}
