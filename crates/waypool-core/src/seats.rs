//! Seat-allocation primitives — pure list/counter transitions on a [`Ride`].
//!
//! These functions mutate a ride value in memory and report what happened;
//! they never touch storage. [`crate::lifecycle::RideLifecycle`] invokes
//! them inside a guarded read-modify-write so that the mutation and the
//! decision it was based on commit atomically per ride.
//!
//! Seats are only spent at accept time. Requests are advisory: many may
//! accumulate against few seats, and the allocator enforces capacity by
//! refusing further accepts, not further requests.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ride::{JoinRequest, Passenger, Ride};

/// Outcome of a seat primitive. Tagged rather than thrown so the lifecycle
/// layer can map each case to the right caller-facing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatOutcome {
  /// The transition was applied to the ride value.
  Applied,
  /// The user already occupies a seat.
  AlreadyPassenger,
  /// The user already has a pending request.
  AlreadyRequested,
  /// `available_seats` is zero.
  NoCapacity,
  /// No pending request from this user.
  NotFound,
}

/// Append a pending request for `user_id`, if they are not already present
/// in either list and the ride still shows capacity.
///
/// Membership check only — the seat counter is untouched; capacity is
/// consumed by [`accept_into_seat`] alone.
pub fn reserve_request_slot(
  ride: &mut Ride,
  user_id: Uuid,
  now: DateTime<Utc>,
) -> SeatOutcome {
  if ride.is_passenger(user_id) {
    return SeatOutcome::AlreadyPassenger;
  }
  if ride.has_request(user_id) {
    return SeatOutcome::AlreadyRequested;
  }
  if ride.available_seats == 0 {
    return SeatOutcome::NoCapacity;
  }
  ride.requests.push(JoinRequest { user_id, requested_at: now });
  SeatOutcome::Applied
}

/// Move `user_id` from `requests` to `passengers` and spend one seat.
/// The sole seat-decrementing operation in the system.
pub fn accept_into_seat(
  ride: &mut Ride,
  user_id: Uuid,
  now: DateTime<Utc>,
) -> SeatOutcome {
  if ride.available_seats == 0 {
    return SeatOutcome::NoCapacity;
  }
  let Some(idx) = ride.requests.iter().position(|r| r.user_id == user_id)
  else {
    return SeatOutcome::NotFound;
  };
  ride.requests.remove(idx);
  ride.passengers.push(Passenger { user_id, joined_at: now });
  ride.available_seats = ride.available_seats.saturating_sub(1);
  SeatOutcome::Applied
}

/// Drop the pending request from `user_id`. No seat change. A missing
/// entry is reported, not silently ignored.
pub fn release_request(ride: &mut Ride, user_id: Uuid) -> SeatOutcome {
  let Some(idx) = ride.requests.iter().position(|r| r.user_id == user_id)
  else {
    return SeatOutcome::NotFound;
  };
  ride.requests.remove(idx);
  SeatOutcome::Applied
}
