//! Bearer-token caller extraction.
//!
//! The API never authenticates anybody itself — it hands the presented
//! token to the configured [`IdentityProvider`] and trusts the user id it
//! gets back.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;
use waypool_core::{
  Error as CoreError,
  external::{Geocoder, IdentityProvider},
  store::RideStore,
};

use crate::{AppState, error::ApiError};

/// The resolved caller. Present in a handler signature means the request
/// carried a credential the identity provider accepted.
pub struct Caller(pub Uuid);

impl<S, I, G> FromRequestParts<AppState<S, I, G>> for Caller
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, I, G>,
  ) -> Result<Self, Self::Rejection> {
    let credential = parts
      .headers
      .get(axum::http::header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .ok_or(ApiError::Core(CoreError::Unauthenticated))?;

    let user_id = state.identity.resolve(credential).await?;
    Ok(Caller(user_id))
  }
}
