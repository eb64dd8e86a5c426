use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};

use crate::engine::{CommandError, StartError};

/// Handler error, rendered as `{ "error": "<message>" }`
#[derive(Debug)]
pub enum ApiError {
  /// No quiz is associated with the request's cookie
  NoSession,
  Start(StartError),
  Command(CommandError),
  /// Malformed request field
  BadRequest(String),
  Internal(String),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::NoSession => StatusCode::NOT_FOUND,
      ApiError::Start(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
      ApiError::Start(_) => StatusCode::BAD_REQUEST,
      ApiError::Command(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
      ApiError::Command(e) if e.is_conflict() => StatusCode::CONFLICT,
      ApiError::Command(_) => StatusCode::BAD_REQUEST,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn message(&self) -> String {
    match self {
      ApiError::NoSession => "No active quiz. Start one first.".to_string(),
      ApiError::Start(e) => e.user_message(),
      ApiError::Command(e) => e.user_message(),
      ApiError::BadRequest(msg) => msg.clone(),
      ApiError::Internal(_) => "Something went wrong".to_string(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    match &self {
      ApiError::Internal(detail) => tracing::error!("Request failed: {}", detail),
      ApiError::Start(e) if e.is_upstream() => tracing::warn!("Quiz start failed: {}", e),
      _ => tracing::debug!("Request rejected: {:?}", self),
    }
    (status, Json(serde_json::json!({ "error": self.message() }))).into_response()
  }
}

impl From<StartError> for ApiError {
  fn from(e: StartError) -> Self {
    ApiError::Start(e)
  }
}

impl From<CommandError> for ApiError {
  fn from(e: CommandError) -> Self {
    ApiError::Command(e)
  }
}

impl From<tokio::task::JoinError> for ApiError {
  fn from(e: tokio::task::JoinError) -> Self {
    ApiError::Internal(format!("quiz task failed: {}", e))
  }
}
