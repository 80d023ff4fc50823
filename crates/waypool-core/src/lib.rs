//! Core types and trait definitions for the Waypool ride marketplace.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod external;
pub mod geo;
pub mod lifecycle;
pub mod query;
pub mod ride;
pub mod seats;
pub mod store;
pub mod user;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
