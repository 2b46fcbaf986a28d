//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use habitly_core::{store::StoreError, validate::ValidationErrors};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error(transparent)]
  Validation(#[from] ValidationErrors),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend failure: uniqueness violations become 409, anything
  /// else is an opaque 500.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    if e.is_conflict() {
      ApiError::Conflict(e.to_string())
    } else {
      ApiError::Store(Box::new(e))
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"habitly\""),
        );
        res
      }
      ApiError::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": "validation failed", "fields": errors })),
      )
        .into_response(),
      ApiError::Conflict(msg) => (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response(),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal server error" })),
        )
          .into_response()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::fmt;

  use super::*;

  #[derive(Debug)]
  struct Backend {
    conflict: bool,
  }

  impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      if self.conflict {
        f.write_str("a habit named \"Read\" already exists")
      } else {
        f.write_str("disk I/O error at /var/lib/secret.db")
      }
    }
  }

  impl std::error::Error for Backend {}

  impl StoreError for Backend {
    fn is_conflict(&self) -> bool { self.conflict }
  }

  async fn render(err: ApiError) -> (StatusCode, String) {
    let resp   = err.into_response();
    let status = resp.status();
    let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
  }

  #[tokio::test]
  async fn store_fault_is_opaque_500() {
    let (status, body) = render(ApiError::from_store(Backend { conflict: false })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"internal server error"}"#);
    assert!(!body.contains("secret.db"));
  }

  #[tokio::test]
  async fn store_conflict_is_409() {
    let (status, body) = render(ApiError::from_store(Backend { conflict: true })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "a habit named \"Read\" already exists");
  }

  #[tokio::test]
  async fn validation_lists_fields() {
    let (status, body) = render(ValidationErrors::single("name", "too short").into()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["fields"][0]["field"], "name");
  }
}
