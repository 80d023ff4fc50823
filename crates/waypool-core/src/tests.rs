//! Lifecycle and invariant tests against an in-memory store that honours
//! the revisioned-swap contract.

use std::{collections::HashMap, convert::Infallible, sync::Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error,
  lifecycle::RideLifecycle,
  query::{Page, Pagination, RideQuery},
  ride::{Location, Ride, RideDraft, RideStatus, VehicleType},
  store::{RideRef, RideStore, SwapOutcome, VersionedRide},
  user::{DEFAULT_RATING, NewUser, User},
};

// ─── In-memory store ─────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryStore {
  rides: Mutex<HashMap<Uuid, VersionedRide>>,
  users: Mutex<HashMap<Uuid, User>>,
}

impl RideStore for MemoryStore {
  type Error = Infallible;

  async fn add_user(&self, input: NewUser) -> Result<User, Infallible> {
    let user = User {
      user_id:       Uuid::new_v4(),
      name:          input.name,
      email:         input.email,
      rating:        DEFAULT_RATING,
      created_rides: Vec::new(),
      joined_rides:  Vec::new(),
      created_at:    Utc::now(),
    };
    self
      .users
      .lock()
      .unwrap()
      .insert(user.user_id, user.clone());
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>, Infallible> {
    Ok(self.users.lock().unwrap().get(&id).cloned())
  }

  async fn note_ride_ref(
    &self,
    user_id: Uuid,
    ride_id: Uuid,
    kind: RideRef,
  ) -> Result<(), Infallible> {
    if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
      match kind {
        RideRef::Created => user.created_rides.push(ride_id),
        RideRef::Joined => user.joined_rides.push(ride_id),
      }
    }
    Ok(())
  }

  async fn insert_ride(&self, ride: Ride) -> Result<(), Infallible> {
    self
      .rides
      .lock()
      .unwrap()
      .insert(ride.ride_id, VersionedRide { ride, revision: 0 });
    Ok(())
  }

  async fn fetch_ride(&self, id: Uuid) -> Result<Option<VersionedRide>, Infallible> {
    Ok(self.rides.lock().unwrap().get(&id).cloned())
  }

  async fn swap_ride(
    &self,
    expected_revision: i64,
    ride: Ride,
  ) -> Result<SwapOutcome, Infallible> {
    let mut rides = self.rides.lock().unwrap();
    match rides.get_mut(&ride.ride_id) {
      Some(stored) if stored.revision == expected_revision => {
        stored.ride = ride;
        stored.revision += 1;
        Ok(SwapOutcome::Applied)
      }
      _ => Ok(SwapOutcome::Stale),
    }
  }

  async fn search(
    &self,
    query: &RideQuery,
    pagination: Pagination,
  ) -> Result<Page<Ride>, Infallible> {
    let mut matched: Vec<Ride> = self
      .rides
      .lock()
      .unwrap()
      .values()
      .map(|v| v.ride.clone())
      .filter(|r| query.matches(r))
      .collect();
    matched.sort_by_key(|r| r.date);
    Ok(Page::from_matches(matched, pagination))
  }

  async fn rides_created_by(
    &self,
    owner: Uuid,
    statuses: &[RideStatus],
  ) -> Result<Vec<Ride>, Infallible> {
    let mut out: Vec<Ride> = self
      .rides
      .lock()
      .unwrap()
      .values()
      .map(|v| v.ride.clone())
      .filter(|r| r.created_by == owner)
      .filter(|r| statuses.is_empty() || statuses.contains(&r.status))
      .collect();
    out.sort_by_key(|r| r.date);
    Ok(out)
  }

  async fn rides_joined_by(
    &self,
    user: Uuid,
    statuses: &[RideStatus],
  ) -> Result<Vec<Ride>, Infallible> {
    let mut out: Vec<Ride> = self
      .rides
      .lock()
      .unwrap()
      .values()
      .map(|v| v.ride.clone())
      .filter(|r| r.is_passenger(user))
      .filter(|r| statuses.is_empty() || statuses.contains(&r.status))
      .collect();
    out.sort_by_key(|r| r.date);
    Ok(out)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn place(name: &str) -> Location {
  Location { address: name.into(), lat: 12.97, lng: 77.59 }
}

fn draft(seats: u32) -> RideDraft {
  RideDraft {
    source:         place("Indiranagar, Bengaluru"),
    destination:    place("Whitefield, Bengaluru"),
    date:           "2024-06-15T10:00:00Z".parse().unwrap(),
    vehicle_type:   VehicleType::Sedan,
    total_seats:    seats,
    price_per_seat: 300.0,
  }
}

async fn setup() -> (RideLifecycle<MemoryStore>, Uuid) {
  let lifecycle = RideLifecycle::new(std::sync::Arc::new(MemoryStore::default()));
  let owner = lifecycle
    .store()
    .add_user(NewUser { name: "Driver".into(), email: "driver@example.com".into() })
    .await
    .unwrap();
  (lifecycle, owner.user_id)
}

async fn rider(lifecycle: &RideLifecycle<MemoryStore>, name: &str) -> Uuid {
  lifecycle
    .store()
    .add_user(NewUser {
      name:  name.into(),
      email: format!("{}@example.com", name.to_lowercase()),
    })
    .await
    .unwrap()
    .user_id
}

async fn current(lifecycle: &RideLifecycle<MemoryStore>, ride_id: Uuid) -> Ride {
  lifecycle
    .store()
    .fetch_ride(ride_id)
    .await
    .unwrap()
    .unwrap()
    .ride
}

// ─── Creation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_ride_sets_counters_and_status() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(3)).await.unwrap();

  assert_eq!(ride.created_by, owner);
  assert_eq!(ride.total_seats, 3);
  assert_eq!(ride.available_seats, 3);
  assert_eq!(ride.status, RideStatus::Scheduled);
  assert!(ride.passengers.is_empty() && ride.requests.is_empty());
  assert!(ride.seats_consistent());
}

#[tokio::test]
async fn create_ride_rejects_bad_input() {
  let (lc, owner) = setup().await;

  let err = lc.create_ride(owner, draft(0)).await.unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));

  let mut negative_price = draft(2);
  negative_price.price_per_seat = -1.0;
  let err = lc.create_ride(owner, negative_price).await.unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));

  let mut bad_coords = draft(2);
  bad_coords.source.lat = f64::NAN;
  let err = lc.create_ride(owner, bad_coords).await.unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn create_ride_requires_known_owner() {
  let (lc, _) = setup().await;
  let err = lc.create_ride(Uuid::new_v4(), draft(2)).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
}

#[tokio::test]
async fn create_ride_notes_back_reference() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();

  let user = lc.store().get_user(owner).await.unwrap().unwrap();
  assert!(user.created_rides.contains(&ride.ride_id));
}

// ─── Join requests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_request_conflicts_and_appends_once() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();
  let a = rider(&lc, "Asha").await;

  lc.request_to_join(ride.ride_id, a).await.unwrap();
  let err = lc.request_to_join(ride.ride_id, a).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  let stored = current(&lc, ride.ride_id).await;
  assert_eq!(stored.requests.len(), 1);
  assert_eq!(stored.available_seats, 2);
}

#[tokio::test]
async fn owner_cannot_request_own_ride() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();

  let err = lc.request_to_join(ride.ride_id, owner).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn request_on_missing_ride_is_not_found() {
  let (lc, _) = setup().await;
  let a = rider(&lc, "Asha").await;
  let err = lc.request_to_join(Uuid::new_v4(), a).await.unwrap_err();
  assert!(matches!(err, Error::RideNotFound(_)));
}

#[tokio::test]
async fn requests_stay_advisory_past_capacity() {
  // Requests may exceed remaining seats; only accept spends capacity.
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(1)).await.unwrap();
  let a = rider(&lc, "Asha").await;
  let b = rider(&lc, "Bala").await;

  lc.request_to_join(ride.ride_id, a).await.unwrap();
  lc.request_to_join(ride.ride_id, b).await.unwrap();

  let stored = current(&lc, ride.ride_id).await;
  assert_eq!(stored.requests.len(), 2);
  assert_eq!(stored.available_seats, 1);
}

// ─── Accept / reject ─────────────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_two_seat_scenario() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();
  let (a, b, c) = (
    rider(&lc, "Asha").await,
    rider(&lc, "Bala").await,
    rider(&lc, "Venu").await,
  );

  lc.request_to_join(ride.ride_id, a).await.unwrap();
  let s = current(&lc, ride.ride_id).await;
  assert_eq!((s.requests.len(), s.available_seats), (1, 2));

  lc.accept_request(ride.ride_id, owner, a).await.unwrap();
  let s = current(&lc, ride.ride_id).await;
  assert_eq!(s.passengers.len(), 1);
  assert!(s.requests.is_empty());
  assert_eq!(s.available_seats, 1);

  lc.request_to_join(ride.ride_id, b).await.unwrap();
  lc.accept_request(ride.ride_id, owner, b).await.unwrap();
  let s = current(&lc, ride.ride_id).await;
  assert_eq!(s.available_seats, 0);

  // C's request still lands — advisory — but can no longer be accepted.
  lc.request_to_join(ride.ride_id, c).await.unwrap();
  let err = lc.accept_request(ride.ride_id, owner, c).await.unwrap_err();
  assert!(matches!(err, Error::NoCapacity));

  let s = current(&lc, ride.ride_id).await;
  assert!(s.seats_consistent());
  assert_eq!(s.requests.len(), 1);
}

#[tokio::test]
async fn only_owner_accepts_or_rejects() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();
  let a = rider(&lc, "Asha").await;
  let intruder = rider(&lc, "Mala").await;

  lc.request_to_join(ride.ride_id, a).await.unwrap();

  let err = lc
    .accept_request(ride.ride_id, intruder, a)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  let err = lc
    .reject_request(ride.ride_id, intruder, a)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn reject_drops_request_without_seat_change() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();
  let a = rider(&lc, "Asha").await;

  lc.request_to_join(ride.ride_id, a).await.unwrap();
  lc.reject_request(ride.ride_id, owner, a).await.unwrap();

  let s = current(&lc, ride.ride_id).await;
  assert!(s.requests.is_empty());
  assert_eq!(s.available_seats, 2);

  // Rejecting again is an error, not a silent no-op.
  let err = lc.reject_request(ride.ride_id, owner, a).await.unwrap_err();
  assert!(matches!(err, Error::RequestNotFound { .. }));
}

#[tokio::test]
async fn accept_records_joined_back_reference() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();
  let a = rider(&lc, "Asha").await;

  lc.request_to_join(ride.ride_id, a).await.unwrap();
  lc.accept_request(ride.ride_id, owner, a).await.unwrap();

  let user = lc.store().get_user(a).await.unwrap().unwrap();
  assert!(user.joined_rides.contains(&ride.ride_id));
}

// ─── Status machine ──────────────────────────────────────────────────────────

#[tokio::test]
async fn status_follows_the_state_machine() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();

  // scheduled → completed skips ongoing: rejected.
  let err = lc
    .set_status(ride.ride_id, owner, RideStatus::Completed)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidState(RideStatus::Scheduled)));

  lc.set_status(ride.ride_id, owner, RideStatus::Ongoing)
    .await
    .unwrap();
  lc.set_status(ride.ride_id, owner, RideStatus::Completed)
    .await
    .unwrap();

  // Terminal: nothing moves out.
  let err = lc
    .set_status(ride.ride_id, owner, RideStatus::Cancelled)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidState(RideStatus::Completed)));
}

#[tokio::test]
async fn terminal_ride_freezes_lists_and_seats() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();
  let a = rider(&lc, "Asha").await;
  let b = rider(&lc, "Bala").await;

  lc.request_to_join(ride.ride_id, a).await.unwrap();
  lc.set_status(ride.ride_id, owner, RideStatus::Cancelled)
    .await
    .unwrap();

  let before = current(&lc, ride.ride_id).await;

  assert!(matches!(
    lc.request_to_join(ride.ride_id, b).await.unwrap_err(),
    Error::InvalidState(RideStatus::Cancelled)
  ));
  assert!(matches!(
    lc.accept_request(ride.ride_id, owner, a).await.unwrap_err(),
    Error::InvalidState(RideStatus::Cancelled)
  ));
  assert!(matches!(
    lc.reject_request(ride.ride_id, owner, a).await.unwrap_err(),
    Error::InvalidState(RideStatus::Cancelled)
  ));

  let after = current(&lc, ride.ride_id).await;
  assert_eq!(after.requests, before.requests);
  assert_eq!(after.passengers, before.passengers);
  assert_eq!(after.available_seats, before.available_seats);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn stale_swap_is_rejected_by_the_store() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(2)).await.unwrap();
  let a = rider(&lc, "Asha").await;

  // Read at revision 0, then let a real mutation advance the revision.
  let snapshot = lc
    .store()
    .fetch_ride(ride.ride_id)
    .await
    .unwrap()
    .unwrap();
  lc.request_to_join(ride.ride_id, a).await.unwrap();

  let outcome = lc
    .store()
    .swap_ride(snapshot.revision, snapshot.ride)
    .await
    .unwrap();
  assert_eq!(outcome, SwapOutcome::Stale);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_never_double_book_the_last_seat() {
  let (lc, owner) = setup().await;
  let ride = lc.create_ride(owner, draft(1)).await.unwrap();
  let a = rider(&lc, "Asha").await;
  let b = rider(&lc, "Bala").await;

  lc.request_to_join(ride.ride_id, a).await.unwrap();
  lc.request_to_join(ride.ride_id, b).await.unwrap();

  let (lc_a, lc_b) = (lc.clone(), lc.clone());
  let ride_id = ride.ride_id;
  let (ra, rb) = tokio::join!(
    tokio::spawn(async move { lc_a.accept_request(ride_id, owner, a).await }),
    tokio::spawn(async move { lc_b.accept_request(ride_id, owner, b).await }),
  );
  let (ra, rb) = (ra.unwrap(), rb.unwrap());

  // Exactly one success; the loser sees NoCapacity.
  assert!(ra.is_ok() != rb.is_ok(), "got {ra:?} / {rb:?}");
  let loser = if ra.is_ok() { rb } else { ra };
  assert!(matches!(loser.unwrap_err(), Error::NoCapacity));

  let s = current(&lc, ride_id).await;
  assert_eq!(s.passengers.len(), 1);
  assert_eq!(s.available_seats, 0);
  assert!(s.seats_consistent());
}
