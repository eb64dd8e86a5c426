use axum::{extract::State, Json};
use serde::Serialize;

use crate::db;
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
  pub database: bool,
  pub ai_configured: bool,
  pub active_sessions: usize,
}

/// GET /api/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
  Json(StatusResponse {
    database: db::ping(&state.db),
    ai_configured: state.ai_configured,
    active_sessions: state.sessions.len(),
  })
}
