//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  /// The record's state does not allow the request, or another action on it
  /// is still running.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<slfdesk_core::Error> for ApiError {
  fn from(e: slfdesk_core::Error) -> Self {
    use slfdesk_core::Error as Core;
    match e {
      Core::Validation(_) | Core::InvalidPhase(_) | Core::UnknownCode { .. } => {
        Self::BadRequest(e.to_string())
      }
      Core::Forbidden { .. } => Self::Forbidden(e.to_string()),
      Core::InvalidTransition { .. } => Self::Conflict(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::NotFound(m)
      | ApiError::BadRequest(m)
      | ApiError::Forbidden(m)
      | ApiError::Conflict(m) => m.clone(),
      ApiError::Store(e) => {
        tracing::warn!(error = %e, "store failure");
        e.to_string()
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn core_errors_map_to_statuses() {
    let cases = [
      (slfdesk_core::Error::Validation("x".into()), StatusCode::BAD_REQUEST),
      (
        slfdesk_core::Error::Forbidden {
          actor:  "budi".into(),
          action: "approve document",
        },
        StatusCode::FORBIDDEN,
      ),
      (
        slfdesk_core::Error::InvalidTransition {
          from:   "approved".into(),
          action: "reject document",
        },
        StatusCode::CONFLICT,
      ),
      (
        slfdesk_core::Error::UnknownCode {
          kind: "document status",
          code: "lost".into(),
        },
        StatusCode::BAD_REQUEST,
      ),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).status(), status);
    }
  }
}
