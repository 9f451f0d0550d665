//! Shopify → local store synchronization.
//!
//! # Architecture
//!
//! ```text
//! SyncService ──► RemoteSource (Shopify Admin API)
//!      │
//!      ├────────► LocalStore   (admin.products, admin.orders, ...)
//!      │
//!      └────────► ActivityLogger (admin.activity_log)
//! ```
//!
//! A run processes entity kinds strictly in the requested order. For each
//! kind the orchestrator fetches every page, maps and upserts each record,
//! then records exactly one activity log entry before moving on. Failures are
//! isolated per kind; only an authentication failure aborts the whole run.
//!
//! The three seams are traits so the orchestrator can be driven by in-memory
//! implementations in tests.

pub mod guard;
pub mod mapping;
pub mod retry;
mod service;

use async_trait::async_trait;
use skateshop_core::EntityKind;
use thiserror::Error;

use crate::models::LocalRecord;
use crate::shopify::RemotePage;

pub use guard::{SyncGuard, SyncPermit};
pub use retry::RetryPolicy;
pub use service::SyncService;

// =============================================================================
// Seams
// =============================================================================

/// Paginated read access to the remote store.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch one page of records for `kind`, starting after `cursor`.
    async fn fetch_page(
        &self,
        kind: EntityKind,
        cursor: Option<String>,
        page_size: i64,
    ) -> Result<RemotePage, RemoteError>;
}

/// Write access to the local mirror.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Insert or update one record keyed by its Shopify ID.
    ///
    /// Returns the number of rows written (1 on success).
    async fn upsert(&self, record: &LocalRecord) -> Result<u64, StoreError>;

    /// Number of stored rows for `kind`.
    async fn count(&self, kind: EntityKind) -> Result<i64, StoreError>;
}

// =============================================================================
// Errors
// =============================================================================

/// Classified failure from the remote source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Credentials were rejected. Never retried; aborts the run.
    #[error("remote authentication failed: {0}")]
    Authentication(String),

    /// Remote asked us to slow down.
    #[error("rate limited by remote (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Connection or timeout failure.
    #[error("transient network error: {0}")]
    TransientNetwork(String),

    /// Unexpected status, GraphQL error or malformed payload.
    #[error("remote protocol error: {0}")]
    Protocol(String),
}

impl RemoteError {
    /// Whether the same request may be re-sent.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::TransientNetwork(_))
    }

    /// Whether this error must abort the whole run.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Failure writing a single record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Record violates a schema constraint (or failed mapping).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => Self::ConstraintViolation(db_err.message().to_string()),
                _ => Self::Database(err.to_string()),
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Errors that escape a synchronization run.
///
/// Per-kind failures are reported inside the run summary instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The remote rejected our credentials; the run was aborted.
    #[error("synchronization aborted: {0}")]
    Authentication(String),

    /// Another run is already synchronizing some of the requested kinds.
    #[error("a synchronization run is already in progress for: {}", format_kinds(.0))]
    AlreadyRunning(Vec<EntityKind>),
}

fn format_kinds(kinds: &[EntityKind]) -> String {
    kinds
        .iter()
        .map(|k| k.plural())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Phases
// =============================================================================

/// Orchestrator state for the kind currently being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Fetching(EntityKind),
    Writing(EntityKind),
    Logging(EntityKind),
    Done,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Fetching(kind) => write!(f, "fetching {}", kind.plural()),
            Self::Writing(kind) => write!(f, "writing {}", kind.plural()),
            Self::Logging(kind) => write!(f, "logging {}", kind.plural()),
            Self::Done => f.write_str("done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(
            RemoteError::RateLimited {
                retry_after_secs: 1
            }
            .is_retryable()
        );
        assert!(RemoteError::TransientNetwork("reset".to_string()).is_retryable());
        assert!(!RemoteError::Protocol("bad".to_string()).is_retryable());
        assert!(!RemoteError::Authentication("nope".to_string()).is_retryable());
        assert!(RemoteError::Authentication("nope".to_string()).is_authentication());
    }

    #[test]
    fn test_non_database_sqlx_error_is_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_already_running_message_names_kinds() {
        let err = SyncError::AlreadyRunning(vec![EntityKind::Product, EntityKind::Order]);
        assert_eq!(
            err.to_string(),
            "a synchronization run is already in progress for: products, orders"
        );
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            SyncPhase::Fetching(EntityKind::Customer).to_string(),
            "fetching customers"
        );
        assert_eq!(SyncPhase::Done.to_string(), "done");
    }
}
