//! Contracts with excluded collaborators: identity and geocoding.
//!
//! The core never authenticates anybody and never talks to a maps API
//! itself; it consumes these traits and trusts what they hand back.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Resolves a caller's presented credential to a stable user id.
pub trait IdentityProvider: Send + Sync {
  /// `Err(Error::Unauthenticated)` when the credential does not resolve.
  fn resolve<'a>(
    &'a self,
    credential: &'a str,
  ) -> impl Future<Output = crate::Result<Uuid>> + Send + 'a;
}

// ─── Geocoding ───────────────────────────────────────────────────────────────

/// A resolved address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
  pub lat:               f64,
  pub lng:               f64,
  pub formatted_address: String,
}

/// Geocoder failures are never surfaced to search callers — the geo filter
/// silently degrades to an address substring match instead.
#[derive(Debug, Error)]
pub enum GeocodeError {
  #[error("address did not resolve")]
  NotFound,
  #[error("geocoder unavailable: {0}")]
  Unavailable(String),
}

/// Turns a free-text address into coordinates.
pub trait Geocoder: Send + Sync {
  fn geocode<'a>(
    &'a self,
    address: &'a str,
  ) -> impl Future<Output = Result<GeocodedPlace, GeocodeError>> + Send + 'a;
}
