//! Skate shop core - shared types library.
//!
//! This crate provides the types shared by the admin back-end and its tools:
//! - `admin` - Shopify synchronization, activity log and HTTP surface
//! - `cli` - Command-line tools for migrations and manual sync runs
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. The optional `postgres` feature adds `sqlx` encoding
//! so the same types can be bound and decoded directly.
//!
//! # Modules
//!
//! - [`types`] - Entity kinds, sync outcomes and results, activity-log records, typed IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
