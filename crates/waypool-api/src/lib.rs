//! JSON REST API for Waypool.
//!
//! Exposes an axum [`Router`] backed by any [`waypool_core::store::RideStore`],
//! an [`IdentityProvider`] and a [`Geocoder`]. TLS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", waypool_api::api_router(state.clone()))
//! ```

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod projection;
pub mod requests;
pub mod rides;
pub mod search;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use waypool_core::{
  external::{Geocoder, IdentityProvider},
  lifecycle::RideLifecycle,
  store::RideStore,
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, I, G> {
  pub lifecycle: RideLifecycle<S>,
  pub identity:  Arc<I>,
  pub geocoder:  Arc<G>,
}

impl<S, I, G> Clone for AppState<S, I, G> {
  fn clone(&self) -> Self {
    Self {
      lifecycle: self.lifecycle.clone(),
      identity:  Arc::clone(&self.identity),
      geocoder:  Arc::clone(&self.geocoder),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, I, G>(state: AppState<S, I, G>) -> Router<()>
where
  S: RideStore + 'static,
  I: IdentityProvider + 'static,
  G: Geocoder + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::create::<S, I, G>))
    .route("/users/{id}", get(users::get_one::<S, I, G>))
    // Rides
    .route(
      "/rides",
      get(search::handler::<S, I, G>).post(rides::create::<S, I, G>),
    )
    .route("/rides/{id}", get(rides::get_one::<S, I, G>))
    .route("/rides/{id}/status", post(rides::set_status::<S, I, G>))
    // Join requests
    .route("/rides/{id}/requests", post(requests::submit::<S, I, G>))
    .route(
      "/rides/{id}/requests/accept",
      post(requests::accept::<S, I, G>),
    )
    .route(
      "/rides/{id}/requests/reject",
      post(requests::reject::<S, I, G>),
    )
    // Caller-scoped views
    .route("/my-rides", get(dashboard::my_rides::<S, I, G>))
    .route("/history", get(dashboard::history::<S, I, G>))
    .with_state(state)
}
