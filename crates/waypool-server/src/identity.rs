//! Bearer-token identity backed by the user table.
//!
//! The deployment story here is intentionally thin: the credential IS the
//! user id, checked for existence against the store. A real deployment
//! would swap this for a token-verifying implementation of the same trait.

use std::sync::Arc;

use uuid::Uuid;
use waypool_core::{Error, Result, external::IdentityProvider, store::RideStore};

pub struct BearerIdentity<S> {
  store: Arc<S>,
}

impl<S> BearerIdentity<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }
}

impl<S: RideStore> IdentityProvider for BearerIdentity<S> {
  async fn resolve(&self, credential: &str) -> Result<Uuid> {
    let user_id: Uuid = credential.parse().map_err(|_| Error::Unauthenticated)?;
    self
      .store
      .get_user(user_id)
      .await
      .map_err(|e| Error::Storage(e.to_string()))?
      .ok_or(Error::Unauthenticated)?;
    Ok(user_id)
  }
}
