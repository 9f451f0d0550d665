//! Skate shop admin library.
//!
//! This crate provides the admin back-end as a library, allowing it to be
//! tested and reused by the CLI.
//!
//! # Modules
//!
//! - [`shopify`] - Shopify Admin API client (HIGH PRIVILEGE token)
//! - [`sync`] - Orchestrates Shopify → `PostgreSQL` synchronization
//! - [`db`] - Local mirror and activity log repositories
//! - [`services`] - Activity logging and credential checks
//! - [`routes`] - JSON HTTP API
//!
//! # Security
//!
//! This crate holds the Shopify Admin API access token. Deploy on private
//! infrastructure only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
pub mod sync;
