//! SQLite backend for the Waypool ride store.
//!
//! One ride per row, with the passenger and request lists embedded as JSON
//! and a `revision` column carrying the optimistic-concurrency token.

pub mod encode;
pub mod error;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use store::SqliteStore;
