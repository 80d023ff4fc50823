//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: `{"name":"...","email":"..."}`; 201 + user |
//! | `GET`  | `/users/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;
use waypool_core::{
  Error as CoreError,
  external::{Geocoder, IdentityProvider},
  store::RideStore,
  user::{NewUser, User},
};

use crate::{AppState, error::ApiError};

/// `POST /users`
pub async fn create<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  if body.email.trim().is_empty() || !body.email.contains('@') {
    return Err(ApiError::BadRequest("email is not valid".into()));
  }

  let user = state
    .lifecycle
    .store()
    .add_user(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/:id`
pub async fn get_one<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  let user = state
    .lifecycle
    .store()
    .get_user(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Core(CoreError::UserNotFound(id)))?;
  Ok(Json(user))
}
