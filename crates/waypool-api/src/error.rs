//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use waypool_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::Core(e) => match e {
        CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::RideNotFound(_)
        | CoreError::UserNotFound(_)
        | CoreError::RequestNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Conflict(_)
        | CoreError::NoCapacity
        | CoreError::InvalidState(_) => StatusCode::CONFLICT,
        CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
