//! The `RideStore` trait — the persistence contract of the marketplace.
//!
//! The trait is implemented by storage backends (e.g.
//! `waypool-store-sqlite`). Higher layers depend on this abstraction, not
//! on any concrete backend.
//!
//! The ride document is the unit of concurrency control. Every ride
//! carries a `revision`; mutations go through [`RideStore::swap_ride`],
//! which only applies when the caller's revision is still current. No
//! operation spans multiple ride documents, so cross-ride transactions are
//! never required.

use std::future::Future;

use uuid::Uuid;

use crate::{
  query::{Page, Pagination, RideQuery},
  ride::{Ride, RideStatus},
  user::{NewUser, User},
};

// ─── Versioning ──────────────────────────────────────────────────────────────

/// A ride together with the revision it was read at. The revision is
/// storage bookkeeping, not domain state, so it never lives on [`Ride`]
/// itself.
#[derive(Debug, Clone)]
pub struct VersionedRide {
  pub ride:     Ride,
  pub revision: i64,
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
  /// The write applied; the stored revision advanced by one.
  Applied,
  /// Someone else wrote first. The caller must re-read and re-decide.
  Stale,
}

/// Which denormalized back-reference list on a user to extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideRef {
  Created,
  Joined,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Waypool storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with axum).
pub trait RideStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. Rating starts at the default of 5.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Append `ride_id` to one of the user's convenience lists. These lists
  /// are best-effort and non-authoritative; the ride's own
  /// `passengers`/`requests` are the source of truth.
  fn note_ride_ref(
    &self,
    user_id: Uuid,
    ride_id: Uuid,
    kind: RideRef,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Rides ─────────────────────────────────────────────────────────────

  /// Persist a freshly created ride at revision 0.
  fn insert_ride(
    &self,
    ride: Ride,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Read one ride with its current revision. Returns `None` if absent.
  fn fetch_ride(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<VersionedRide>, Self::Error>> + Send + '_;

  /// Conditionally replace the stored ride: applies only if the stored
  /// revision still equals `expected_revision`, advancing it by one.
  fn swap_ride(
    &self,
    expected_revision: i64,
    ride: Ride,
  ) -> impl Future<Output = Result<SwapOutcome, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Evaluate `query` and return one date-ascending page plus the total
  /// match count. Must agree with [`RideQuery::matches`].
  fn search<'a>(
    &'a self,
    query: &'a RideQuery,
    pagination: Pagination,
  ) -> impl Future<Output = Result<Page<Ride>, Self::Error>> + Send + 'a;

  /// All rides created by `owner`, optionally narrowed to a status set,
  /// date ascending.
  fn rides_created_by<'a>(
    &'a self,
    owner: Uuid,
    statuses: &'a [RideStatus],
  ) -> impl Future<Output = Result<Vec<Ride>, Self::Error>> + Send + 'a;

  /// All rides where `user` occupies a seat, optionally narrowed to a
  /// status set, date ascending.
  fn rides_joined_by<'a>(
    &'a self,
    user: Uuid,
    statuses: &'a [RideStatus],
  ) -> impl Future<Output = Result<Vec<Ride>, Self::Error>> + Send + 'a;
}
