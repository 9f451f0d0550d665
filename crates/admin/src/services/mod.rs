//! Business logic services for admin.
//!
//! # Services
//!
//! - `activity` - Append-only activity log for synchronization runs
//! - `auth` - Admin credential check for session login

pub mod activity;
pub mod auth;

pub use activity::{ActivityLog, ActivityLogger};
pub use auth::{AdminAuthError, verify_credentials};
