//! Error type shared by generation, progression and the HTTP/WS layers.

use axum::{
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
  #[error("Invalid request: {0}")]
  InvalidRequest(String),

  #[error("Not enough candidates: {available} of {requested} requested problems available (empty bands: {})", fmt_bands(.empty_bands))]
  InsufficientCandidates {
    empty_bands: Vec<(i32, i32)>,
    requested: u32,
    available: u32,
  },

  #[error("Invalid transition: {0}")]
  InvalidTransition(String),

  #[error("Problem at position {position} is not current (frontier: {})", .frontier.map(|p| p.to_string()).unwrap_or_else(|| "none".into()))]
  NotCurrent { position: u32, frontier: Option<u32> },

  #[error("{0} not found")]
  NotFound(String),

  #[error("Concurrent updates kept conflicting on path {0}")]
  Conflict(Uuid),

  #[error("Invariant violated: {0}")]
  InvariantViolated(String),
}

fn fmt_bands(bands: &[(i32, i32)]) -> String {
  if bands.is_empty() {
    return "none".into();
  }
  bands
    .iter()
    .map(|(lo, hi)| format!("[{lo},{hi})"))
    .collect::<Vec<_>>()
    .join(", ")
}

impl PathError {
  /// Stable machine-readable code used in JSON error bodies.
  pub fn code(&self) -> &'static str {
    match self {
      PathError::InvalidRequest(_) => "invalid_request",
      PathError::InsufficientCandidates { .. } => "insufficient_candidates",
      PathError::InvalidTransition(_) => "invalid_transition",
      PathError::NotCurrent { .. } => "not_current",
      PathError::NotFound(_) => "not_found",
      PathError::Conflict(_) => "conflict",
      PathError::InvariantViolated(_) => "internal_error",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      PathError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
      PathError::InsufficientCandidates { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      PathError::InvalidTransition(_) | PathError::NotCurrent { .. } | PathError::Conflict(_) => {
        StatusCode::CONFLICT
      }
      PathError::NotFound(_) => StatusCode::NOT_FOUND,
      PathError::InvariantViolated(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for PathError {
  fn from(r: JsonRejection) -> Self {
    PathError::InvalidRequest(r.body_text())
  }
}

impl From<QueryRejection> for PathError {
  fn from(r: QueryRejection) -> Self {
    PathError::InvalidRequest(r.body_text())
  }
}

impl From<PathRejection> for PathError {
  fn from(r: PathRejection) -> Self {
    PathError::InvalidRequest(r.body_text())
  }
}

#[derive(Serialize)]
pub struct ErrorOut {
  pub error: &'static str,
  pub message: String,
}

impl IntoResponse for PathError {
  fn into_response(self) -> Response {
    let body = ErrorOut { error: self.code(), message: self.to_string() };
    (self.status(), Json(body)).into_response()
  }
}
