//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use relief_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request body was not the JSON the handler expects.
  #[error("{}", .0.body_text())]
  Json(#[from] JsonRejection),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::Core(e) => match e {
        CoreError::Validation(_) | CoreError::InvalidLocation { .. } => {
          StatusCode::UNPROCESSABLE_ENTITY
        }
        CoreError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        CoreError::AlreadyTerminal { .. } => StatusCode::CONFLICT,
        CoreError::InvalidReportKind(_) | CoreError::InvalidStatus { .. } => {
          StatusCode::BAD_REQUEST
        }
        CoreError::ReportNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Unauthenticated | CoreError::SessionPending => StatusCode::UNAUTHORIZED,
        CoreError::StoreUnavailable(_) | CoreError::AuthUnavailable(_) => {
          StatusCode::SERVICE_UNAVAILABLE
        }
      },
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Json(rejection) => rejection.status(),
      ApiError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      ApiError::Core(CoreError::Validation(fields)) => {
        json!({ "error": self.to_string(), "fields": fields })
      }
      _ => json!({ "error": self.to_string() }),
    };

    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"relief\""),
      );
    }
    res
  }
}
