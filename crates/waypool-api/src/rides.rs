//! Handlers for `/rides` creation, detail, and status endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/rides` | Body: [`RideDraft`]; 201 + [`RideDetail`] |
//! | `GET`  | `/rides/:id` | [`RideDetail`]; 404 if absent |
//! | `POST` | `/rides/:id/status` | Body: `{"status":"ongoing"}`; owner only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use waypool_core::{
  Error as CoreError,
  external::{Geocoder, IdentityProvider},
  ride::{RideDraft, RideStatus},
  store::RideStore,
};

use crate::{AppState, auth::Caller, error::ApiError, projection::RideDetail};

/// `POST /rides`
pub async fn create<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Caller(owner): Caller,
  Json(draft): Json<RideDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  let ride = state.lifecycle.create_ride(owner, draft).await?;
  tracing::info!(ride = %ride.ride_id, driver = %owner, "ride published");
  Ok((StatusCode::CREATED, Json(RideDetail::from(&ride))))
}

/// `GET /rides/:id`
pub async fn get_one<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RideDetail>, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  let versioned = state
    .lifecycle
    .store()
    .fetch_ride(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Core(CoreError::RideNotFound(id)))?;
  Ok(Json(RideDetail::from(&versioned.ride)))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: RideStatus,
}

/// `POST /rides/:id/status` — drive the state machine forward.
pub async fn set_status<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  state.lifecycle.set_status(id, caller, body.status).await?;
  Ok(Json(json!({ "message": "status updated" })))
}
