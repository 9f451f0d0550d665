//! Core types for the skate shop admin.
//!
//! This module provides type-safe wrappers for the synchronization domain.

pub mod activity;
pub mod entity;
pub mod id;
pub mod sync;

pub use activity::{
    ActivityLogEntry, ActivityLogFilter, ActivityStatistics, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT,
    NewActivityLogEntry,
};
pub use entity::{EntityKind, ParseEntityKindError};
pub use id::*;
pub use sync::{EntitySyncResult, SyncOutcome, SyncRunSummary};
