pub mod error;
pub mod history;
pub mod quiz;
pub mod status;

use axum::{routing::get, routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use error::ApiError;
pub use quiz::SESSION_COOKIE_NAME;

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/api/quiz", post(quiz::start_quiz).get(quiz::get_quiz))
    .route("/api/quiz/answer", post(quiz::submit_answer))
    .route("/api/quiz/manual", post(quiz::mark_definition))
    .route("/api/quiz/spelling", post(quiz::submit_spelling))
    .route("/api/quiz/option", post(quiz::select_option))
    .route("/api/quiz/next", post(quiz::next_question))
    .route("/api/quiz/match", post(quiz::select_match_pair))
    .route("/api/quiz/unmatch", post(quiz::remove_match))
    .route("/api/quiz/check", post(quiz::check_matches))
    .route("/api/quiz/practice", post(quiz::practice_missed))
    .route("/api/quiz/enhance", post(quiz::enhance))
    .route("/api/history", get(history::list_history))
    .route("/api/status", get(status::status))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
