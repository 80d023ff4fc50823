//! Ride — the central entity of the marketplace.
//!
//! A ride is a single scheduled trip offer with fixed capacity and price.
//! Route, schedule, capacity and price are immutable after creation; only
//! the seat-allocation state (`passengers`, `requests`, `available_seats`)
//! and `status` ever change, and only through [`crate::lifecycle`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Location ────────────────────────────────────────────────────────────────

/// A named point on the map. The address is what the user typed (or the
/// geocoder's formatted form); the coordinates are authoritative for geo
/// queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub address: String,
  pub lat:     f64,
  pub lng:     f64,
}

impl Location {
  /// Both coordinates are finite and inside the WGS84 envelope.
  pub fn is_valid(&self) -> bool {
    self.lat.is_finite()
      && self.lng.is_finite()
      && (-90.0..=90.0).contains(&self.lat)
      && (-180.0..=180.0).contains(&self.lng)
  }
}

// ─── VehicleType ─────────────────────────────────────────────────────────────

/// Fixed vehicle taxonomy. The string form doubles as the database
/// discriminant.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
  #[default]
  Auto,
  Bike,
  Economy,
  Sedan,
  Xl,
  Premier,
}

impl VehicleType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Auto => "auto",
      Self::Bike => "bike",
      Self::Economy => "economy",
      Self::Sedan => "sedan",
      Self::Xl => "xl",
      Self::Premier => "premier",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "auto" => Ok(Self::Auto),
      "bike" => Ok(Self::Bike),
      "economy" => Ok(Self::Economy),
      "sedan" => Ok(Self::Sedan),
      "xl" => Ok(Self::Xl),
      "premier" => Ok(Self::Premier),
      other => Err(Error::InvalidInput(format!("unknown vehicle type: {other:?}"))),
    }
  }
}

// ─── RideStatus ──────────────────────────────────────────────────────────────

/// Ride state machine:
/// `scheduled → ongoing → completed`, with `cancelled` reachable from any
/// non-terminal state. `completed` and `cancelled` are terminal — no list
/// or seat mutation is permitted once a ride reaches either.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
  #[default]
  Scheduled,
  Ongoing,
  Completed,
  Cancelled,
}

impl RideStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Scheduled => "scheduled",
      Self::Ongoing => "ongoing",
      Self::Completed => "completed",
      Self::Cancelled => "cancelled",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "scheduled" => Ok(Self::Scheduled),
      "ongoing" => Ok(Self::Ongoing),
      "completed" => Ok(Self::Completed),
      "cancelled" => Ok(Self::Cancelled),
      other => Err(Error::InvalidInput(format!("unknown ride status: {other:?}"))),
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Cancelled)
  }

  /// Whether join requests and accept/reject are permitted in this status.
  pub fn accepts_requests(&self) -> bool {
    matches!(self, Self::Scheduled | Self::Ongoing)
  }

  /// Legal transitions of the status state machine.
  pub fn can_transition_to(&self, next: RideStatus) -> bool {
    match (self, next) {
      (Self::Scheduled, Self::Ongoing) => true,
      (Self::Ongoing, Self::Completed) => true,
      (Self::Scheduled | Self::Ongoing, Self::Cancelled) => true,
      _ => false,
    }
  }

  /// The two non-terminal statuses — the "browse open rides" default.
  pub const OPEN: [RideStatus; 2] = [Self::Scheduled, Self::Ongoing];

  /// The two terminal statuses — the history default.
  pub const TERMINAL: [RideStatus; 2] = [Self::Completed, Self::Cancelled];
}

impl std::fmt::Display for RideStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Seat lists ──────────────────────────────────────────────────────────────

/// A user occupying a seat. Entries are appended on accept and never
/// removed (there is no leave-ride operation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
  pub user_id:   Uuid,
  pub joined_at: DateTime<Utc>,
}

/// A pending ask to join. Not yet consuming a seat; removed on accept or
/// reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
  pub user_id:      Uuid,
  pub requested_at: DateTime<Utc>,
}

// ─── Ride ────────────────────────────────────────────────────────────────────

/// The marketplace's central entity.
///
/// Invariants held at every quiescent point:
/// - `available_seats == total_seats - passengers.len()`
/// - `available_seats ∈ [0, total_seats]`
/// - a user id appears at most once across `passengers` and `requests`
/// - `created_by` appears in neither list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
  pub ride_id:         Uuid,
  pub created_by:      Uuid,
  pub source:          Location,
  pub destination:     Location,
  /// Scheduled departure, UTC. Immutable — there is no reschedule.
  pub date:            DateTime<Utc>,
  pub vehicle_type:    VehicleType,
  pub total_seats:     u32,
  pub available_seats: u32,
  pub price_per_seat:  f64,
  pub passengers:      Vec<Passenger>,
  pub requests:        Vec<JoinRequest>,
  pub status:          RideStatus,
  /// Server-assigned; never changes after creation.
  pub created_at:      DateTime<Utc>,
}

impl Ride {
  pub fn is_passenger(&self, user_id: Uuid) -> bool {
    self.passengers.iter().any(|p| p.user_id == user_id)
  }

  pub fn has_request(&self, user_id: Uuid) -> bool {
    self.requests.iter().any(|r| r.user_id == user_id)
  }

  /// Recompute the cached seat invariant — used by consistency checks and
  /// tests, never to "fix up" state.
  pub fn seats_consistent(&self) -> bool {
    self.available_seats <= self.total_seats
      && self.available_seats as usize + self.passengers.len()
        == self.total_seats as usize
  }
}

// ─── RideDraft ───────────────────────────────────────────────────────────────

/// Input to [`crate::lifecycle::RideLifecycle::create_ride`]. The id,
/// owner, seat counter and timestamps are assigned by the lifecycle, not
/// accepted from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct RideDraft {
  pub source:         Location,
  pub destination:    Location,
  pub date:           DateTime<Utc>,
  #[serde(default)]
  pub vehicle_type:   VehicleType,
  pub total_seats:    u32,
  pub price_per_seat: f64,
}

impl RideDraft {
  /// Precondition checks that are independent of any stored state.
  pub fn validate(&self) -> Result<()> {
    if self.total_seats < 1 {
      return Err(Error::InvalidInput("total_seats must be at least 1".into()));
    }
    if !self.price_per_seat.is_finite() || self.price_per_seat < 0.0 {
      return Err(Error::InvalidInput("price_per_seat must be non-negative".into()));
    }
    if !self.source.is_valid() {
      return Err(Error::InvalidInput("source coordinates are not valid".into()));
    }
    if !self.destination.is_valid() {
      return Err(Error::InvalidInput("destination coordinates are not valid".into()));
    }
    Ok(())
  }
}
