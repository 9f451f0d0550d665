//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. `RequireAdminAuth` extractor on protected handlers

pub mod auth;
pub mod session;

pub use auth::{AdminAuthRejection, RequireAdminAuth, clear_current_admin, set_current_admin};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer_with_store};
