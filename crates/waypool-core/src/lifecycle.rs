//! `RideLifecycle` — the single entry point for state-changing ride
//! operations.
//!
//! Each operation is a guarded read-modify-write: read the ride at its
//! current revision, validate preconditions, apply the seat primitive to
//! the in-memory value, then write back conditionally on the revision
//! being unchanged. A stale write means someone else committed first; the
//! operation re-reads and re-decides against the fresh state, so two
//! concurrent accepts for the last seat can never both succeed — the loser
//! re-evaluates, finds zero seats, and fails with `NoCapacity`.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  ride::{Ride, RideDraft, RideStatus},
  seats::{self, SeatOutcome},
  store::{RideRef, RideStore, SwapOutcome, VersionedRide},
};

/// Upper bound on swap retries. Contention on a single ride is short-lived
/// (each attempt is one read and one conditional write); exhausting this
/// means the store is livelocked and the caller should see a storage
/// failure rather than spin forever.
const SWAP_RETRY_LIMIT: u32 = 8;

pub struct RideLifecycle<S> {
  store: Arc<S>,
}

impl<S> Clone for RideLifecycle<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: RideStore> RideLifecycle<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  fn storage(e: S::Error) -> Error {
    Error::Storage(e.to_string())
  }

  // ── Create ────────────────────────────────────────────────────────────

  /// Validate the draft, assign identity and the seat counter, and
  /// persist. `available_seats` starts equal to `total_seats`; status
  /// starts `scheduled`.
  pub async fn create_ride(&self, owner: Uuid, draft: RideDraft) -> Result<Ride> {
    draft.validate()?;

    self
      .store
      .get_user(owner)
      .await
      .map_err(Self::storage)?
      .ok_or(Error::UserNotFound(owner))?;

    let ride = Ride {
      ride_id:         Uuid::new_v4(),
      created_by:      owner,
      source:          draft.source,
      destination:     draft.destination,
      date:            draft.date,
      vehicle_type:    draft.vehicle_type,
      total_seats:     draft.total_seats,
      available_seats: draft.total_seats,
      price_per_seat:  draft.price_per_seat,
      passengers:      Vec::new(),
      requests:        Vec::new(),
      status:          RideStatus::Scheduled,
      created_at:      Utc::now(),
    };

    self
      .store
      .insert_ride(ride.clone())
      .await
      .map_err(Self::storage)?;

    // Convenience back-reference; the ride row is already authoritative.
    let _ = self
      .store
      .note_ride_ref(owner, ride.ride_id, RideRef::Created)
      .await;

    Ok(ride)
  }

  // ── Guarded read-modify-write ─────────────────────────────────────────

  /// Fetch, apply, conditionally write back; retry when the write loses a
  /// race. Precondition failures inside `apply` abort without a write.
  async fn mutate<F>(&self, ride_id: Uuid, mut apply: F) -> Result<Ride>
  where
    F: FnMut(&mut Ride) -> Result<()>,
  {
    for _ in 0..SWAP_RETRY_LIMIT {
      let VersionedRide { mut ride, revision } = self
        .store
        .fetch_ride(ride_id)
        .await
        .map_err(Self::storage)?
        .ok_or(Error::RideNotFound(ride_id))?;

      apply(&mut ride)?;

      match self
        .store
        .swap_ride(revision, ride.clone())
        .await
        .map_err(Self::storage)?
      {
        SwapOutcome::Applied => return Ok(ride),
        SwapOutcome::Stale => continue,
      }
    }
    Err(Error::Storage("ride update contention did not resolve".into()))
  }

  // ── Join requests ─────────────────────────────────────────────────────

  /// Append a pending join request. Capacity is NOT consumed here —
  /// requests are advisory until accepted, so more requests than seats may
  /// accumulate. The guarantee that matters is enforced at accept time.
  pub async fn request_to_join(&self, ride_id: Uuid, requester: Uuid) -> Result<()> {
    self
      .mutate(ride_id, |ride| {
        if ride.created_by == requester {
          return Err(Error::Forbidden("drivers cannot request their own ride"));
        }
        if !ride.status.accepts_requests() {
          return Err(Error::InvalidState(ride.status));
        }
        match seats::reserve_request_slot(ride, requester, Utc::now()) {
          SeatOutcome::Applied => Ok(()),
          SeatOutcome::AlreadyPassenger => Err(Error::Conflict("already a passenger")),
          SeatOutcome::AlreadyRequested => Err(Error::Conflict("request already pending")),
          SeatOutcome::NoCapacity => Err(Error::NoCapacity),
          SeatOutcome::NotFound => {
            Err(Error::RequestNotFound { ride: ride_id, user: requester })
          }
        }
      })
      .await?;
    Ok(())
  }

  /// Move a pending requester into a seat. Only the driver may accept; the
  /// seat decrement and both list edits commit as one conditional write.
  pub async fn accept_request(
    &self,
    ride_id: Uuid,
    caller: Uuid,
    target: Uuid,
  ) -> Result<()> {
    self
      .mutate(ride_id, |ride| {
        if ride.created_by != caller {
          return Err(Error::Forbidden("only the driver may accept requests"));
        }
        if !ride.status.accepts_requests() {
          return Err(Error::InvalidState(ride.status));
        }
        match seats::accept_into_seat(ride, target, Utc::now()) {
          SeatOutcome::Applied => Ok(()),
          SeatOutcome::NoCapacity => Err(Error::NoCapacity),
          SeatOutcome::NotFound => {
            Err(Error::RequestNotFound { ride: ride_id, user: target })
          }
          SeatOutcome::AlreadyPassenger | SeatOutcome::AlreadyRequested => {
            Err(Error::Conflict("already a passenger"))
          }
        }
      })
      .await?;

    // Convenience back-reference; may lag, never authoritative.
    let _ = self
      .store
      .note_ride_ref(target, ride_id, RideRef::Joined)
      .await;

    Ok(())
  }

  /// Drop a pending request without touching seats. Rejecting an absent
  /// request is an error, not a no-op.
  pub async fn reject_request(
    &self,
    ride_id: Uuid,
    caller: Uuid,
    target: Uuid,
  ) -> Result<()> {
    self
      .mutate(ride_id, |ride| {
        if ride.created_by != caller {
          return Err(Error::Forbidden("only the driver may reject requests"));
        }
        if !ride.status.accepts_requests() {
          return Err(Error::InvalidState(ride.status));
        }
        match seats::release_request(ride, target) {
          SeatOutcome::Applied => Ok(()),
          _ => Err(Error::RequestNotFound { ride: ride_id, user: target }),
        }
      })
      .await?;
    Ok(())
  }

  // ── Status transitions ────────────────────────────────────────────────

  /// Driver-initiated status change, constrained to the state machine:
  /// `scheduled → ongoing → completed`, `cancelled` from any non-terminal
  /// state. No transition leaves a terminal status.
  pub async fn set_status(
    &self,
    ride_id: Uuid,
    caller: Uuid,
    next: RideStatus,
  ) -> Result<()> {
    self
      .mutate(ride_id, |ride| {
        if ride.created_by != caller {
          return Err(Error::Forbidden("only the driver may change ride status"));
        }
        if !ride.status.can_transition_to(next) {
          return Err(Error::InvalidState(ride.status));
        }
        ride.status = next;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
