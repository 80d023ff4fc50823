//! Caller-scoped ride views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/my-rides?phase=active\|history\|all` | created + joined lists |
//! | `GET` | `/history` | flat terminal-ride feed, newest first |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use waypool_core::{
  external::{Geocoder, IdentityProvider},
  ride::{Ride, RideStatus},
  store::RideStore,
};

use crate::{AppState, auth::Caller, error::ApiError, projection::RideDetail};

// ─── My rides ────────────────────────────────────────────────────────────────

/// Which slice of the caller's rides to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  #[default]
  Active,
  History,
  All,
}

impl Phase {
  fn statuses(self) -> &'static [RideStatus] {
    match self {
      Self::Active => &RideStatus::OPEN,
      Self::History => &RideStatus::TERMINAL,
      Self::All => &[],
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct MyRidesParams {
  #[serde(default)]
  pub phase: Phase,
}

/// Created rides carry their pending requests so the owner can act on
/// them; joined rides are the same shape for uniformity.
#[derive(Debug, Serialize)]
pub struct MyRidesResponse {
  pub created: Vec<RideDetail>,
  pub joined:  Vec<RideDetail>,
}

/// `GET /my-rides`
pub async fn my_rides<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Caller(caller): Caller,
  Query(params): Query<MyRidesParams>,
) -> Result<Json<MyRidesResponse>, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  let statuses = params.phase.statuses();
  let store = state.lifecycle.store();

  let created = store
    .rides_created_by(caller, statuses)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let joined = store
    .rides_joined_by(caller, statuses)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(MyRidesResponse {
    created: created.iter().map(RideDetail::from).collect(),
    joined:  joined.iter().map(RideDetail::from).collect(),
  }))
}

// ─── History ─────────────────────────────────────────────────────────────────

/// How the caller was involved in a past ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Created,
  Joined,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
  pub role: Role,
  #[serde(flatten)]
  pub ride: RideDetail,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
  pub count: usize,
  pub items: Vec<HistoryEntry>,
}

/// `GET /history` — every completed or cancelled ride the caller drove or
/// rode in, newest departure first.
pub async fn history<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Caller(caller): Caller,
) -> Result<Json<HistoryResponse>, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  let store = state.lifecycle.store();

  let created = store
    .rides_created_by(caller, &RideStatus::TERMINAL)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let joined = store
    .rides_joined_by(caller, &RideStatus::TERMINAL)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let entry = |role: Role| move |ride: &Ride| HistoryEntry {
    role,
    ride: RideDetail::from(ride),
  };
  let mut items: Vec<HistoryEntry> = created
    .iter()
    .map(entry(Role::Created))
    .chain(joined.iter().map(entry(Role::Joined)))
    .collect();
  items.sort_by(|a, b| b.ride.summary.date.cmp(&a.ride.summary.date));

  Ok(Json(HistoryResponse { count: items.len(), items }))
}
