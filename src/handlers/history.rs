use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::LogOnError;
use crate::domain::{Attempt, PastQuiz, WordEntry};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HistoryEntry {
  pub key: String,
  pub entries: Vec<WordEntry>,
  pub history: Vec<Attempt>,
}

impl From<PastQuiz> for HistoryEntry {
  fn from(quiz: PastQuiz) -> Self {
    Self {
      key: quiz.key().to_string(),
      entries: quiz.entries,
      history: quiz.history,
    }
  }
}

/// GET /api/history - Past word sets, most recently used first
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
  let quizzes = state
    .services
    .history
    .list()
    .log_warn_default("Failed to load quiz history");
  Json(quizzes.into_iter().map(HistoryEntry::from).collect())
}
