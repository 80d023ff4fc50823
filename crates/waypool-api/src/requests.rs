//! Handlers for the join-request endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/rides/:id/requests` | Caller asks to join; 201 |
//! | `POST` | `/rides/:id/requests/accept` | Body: `{"user_id":...}`; owner only |
//! | `POST` | `/rides/:id/requests/reject` | Body: `{"user_id":...}`; owner only |

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
  external::{Geocoder, IdentityProvider},
  store::RideStore,
};

use crate::{AppState, auth::Caller, error::ApiError};

/// `POST /rides/:id/requests`
pub async fn submit<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Caller(requester): Caller,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  state.lifecycle.request_to_join(id, requester).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "request submitted" })),
  ))
}

/// Target of an accept/reject action.
#[derive(Debug, Deserialize)]
pub struct TargetBody {
  pub user_id: Uuid,
}

/// `POST /rides/:id/requests/accept`
pub async fn accept<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<TargetBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  state.lifecycle.accept_request(id, caller, body.user_id).await?;
  tracing::info!(ride = %id, passenger = %body.user_id, "request accepted");
  Ok(Json(json!({ "message": "accepted" })))
}

/// `POST /rides/:id/requests/reject`
pub async fn reject<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<TargetBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  state.lifecycle.reject_request(id, caller, body.user_id).await?;
  Ok(Json(json!({ "message": "rejected" })))
}
