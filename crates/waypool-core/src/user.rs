//! User — referenced by id throughout the core.
//!
//! Authentication lives outside the core; a user here is just the stable
//! identity rides refer to, plus a stored rating scalar and two
//! denormalized convenience lists. The lists may lag reality — the
//! authoritative membership is always the ride's own
//! `passengers`/`requests`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rating assigned to every new user.
pub const DEFAULT_RATING: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub name:          String,
  pub email:         String,
  /// Stored scalar only; no rating computation happens in this system.
  pub rating:        f64,
  /// Best-effort back-references; never used to enforce an invariant.
  pub created_rides: Vec<Uuid>,
  pub joined_rides:  Vec<Uuid>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::RideStore::add_user`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub name:  String,
  pub email: String,
}
