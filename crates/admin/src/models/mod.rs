//! Domain models for admin.
//!
//! - [`catalog`] - local rows for the synchronized Shopify entity kinds
//! - [`session`] - identity stored in the admin session

pub mod catalog;
pub mod session;

pub use catalog::{
    LocalCollection, LocalCustomer, LocalOrder, LocalProduct, LocalPromotion, LocalRecord,
};
pub use session::{CurrentAdmin, keys as session_keys};
