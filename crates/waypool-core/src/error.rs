//! Error taxonomy for `waypool-core`.
//!
//! Every lifecycle and search operation fails with exactly one of these
//! kinds. A failed call never leaves a partially-applied mutation behind:
//! an accept either happened or it didn't.

use thiserror::Error;
use uuid::Uuid;

use crate::ride::RideStatus;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or out-of-range caller data; never retried automatically.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// The caller could not be resolved to a user id.
  #[error("unauthenticated")]
  Unauthenticated,

  /// The caller is authenticated but not allowed to do this.
  #[error("forbidden: {0}")]
  Forbidden(&'static str),

  #[error("ride not found: {0}")]
  RideNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  /// No pending request from this user on this ride.
  #[error("no pending request from user {user} on ride {ride}")]
  RequestNotFound { ride: Uuid, user: Uuid },

  /// The user is already a passenger or already has a pending request.
  #[error("duplicate join attempt: {0}")]
  Conflict(&'static str),

  /// Seats exhausted. Also surfaced when an accept loses the race for the
  /// last seat — indistinguishable from "seats were already gone" on
  /// purpose.
  #[error("no seats available")]
  NoCapacity,

  /// The operation is not valid for the ride's current status.
  #[error("ride status {0} does not permit this operation")]
  InvalidState(RideStatus),

  /// The persistence layer is unreachable or refused the write. Fatal to
  /// the current call; retries are caller-initiated.
  #[error("storage unavailable: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
