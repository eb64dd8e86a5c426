//! Quiz session endpoints. Every command replies with the session snapshot.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use super::error::ApiError;
use crate::ai::EnhancementKind;
use crate::domain::QuizMode;
use crate::engine::{CommandError, Enhancement, QuizSession, QuizSnapshot};
use crate::session::{generate_session_id, SharedSession};
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "quiz_session";

type Snapshot = Result<Json<QuizSnapshot>, ApiError>;

#[derive(Deserialize)]
pub struct StartRequest {
  pub words: String,
  pub mode: Option<String>,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
  pub answer: String,
}

#[derive(Deserialize)]
pub struct ManualRequest {
  pub correct: bool,
}

#[derive(Deserialize)]
pub struct SpellingRequest {
  #[serde(default)]
  pub spelling: String,
}

#[derive(Deserialize)]
pub struct OptionRequest {
  pub option: String,
}

#[derive(Deserialize)]
pub struct MatchRequest {
  pub word: String,
  pub definition: String,
}

#[derive(Deserialize)]
pub struct UnmatchRequest {
  pub word: String,
}

#[derive(Deserialize)]
pub struct EnhanceRequest {
  pub kind: String,
}

fn session_cookie(session_id: String) -> Cookie<'static> {
  Cookie::build((SESSION_COOKIE_NAME, session_id))
    .path("/")
    .http_only(true)
    .secure(false) // Set to true in production with HTTPS
    .build()
}

/// Session ID from the cookie and the quiz it points to
fn current_session(state: &AppState, jar: &CookieJar) -> Result<(String, SharedSession), ApiError> {
  let session_id = jar
    .get(SESSION_COOKIE_NAME)
    .map(|c| c.value().to_string())
    .ok_or(ApiError::NoSession)?;
  let session = state.sessions.get(&session_id).ok_or(ApiError::NoSession)?;
  Ok((session_id, session))
}

/// POST /api/quiz - Start a quiz and attach it to a fresh session cookie
pub async fn start_quiz(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(req): Json<StartRequest>,
) -> Result<(CookieJar, Json<QuizSnapshot>), ApiError> {
  let mode = match req.mode.as_deref() {
    None => QuizMode::default(),
    Some(name) => QuizMode::from_str(name)
      .ok_or_else(|| ApiError::BadRequest(format!("Unknown quiz mode '{}'", name)))?,
  };

  let services = state.services.clone();
  let rng = StdRng::from_rng(&mut rand::rng());
  // Spawned so a dropped connection does not cancel collaborator calls midway
  let session =
    tokio::spawn(async move { QuizSession::start(&req.words, mode, &services, rng).await })
      .await??;

  if let Some(old) = jar.get(SESSION_COOKIE_NAME) {
    state.sessions.remove(old.value());
  }
  let session_id = generate_session_id();
  let snapshot = session.snapshot();
  state.sessions.insert(&session_id, session);

  Ok((jar.add(session_cookie(session_id)), Json(snapshot)))
}

/// GET /api/quiz
pub async fn get_quiz(State(state): State<AppState>, jar: CookieJar) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let quiz = session.lock().await;
  Ok(Json(quiz.snapshot()))
}

/// POST /api/quiz/answer
pub async fn submit_answer(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(req): Json<AnswerRequest>,
) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let services = state.services.clone();
  let snapshot = tokio::spawn(async move {
    let mut quiz = session.lock().await;
    quiz.submit_answer(&req.answer, &services).await?;
    Ok::<_, CommandError>(quiz.snapshot())
  })
  .await??;
  Ok(Json(snapshot))
}

/// POST /api/quiz/manual - Self-reported verdict after evaluation failed
pub async fn mark_definition(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(req): Json<ManualRequest>,
) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let mut quiz = session.lock().await;
  quiz.mark_definition(req.correct)?;
  Ok(Json(quiz.snapshot()))
}

/// POST /api/quiz/spelling
pub async fn submit_spelling(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(req): Json<SpellingRequest>,
) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let mut quiz = session.lock().await;
  quiz.submit_spelling(&req.spelling)?;
  Ok(Json(quiz.snapshot()))
}

/// POST /api/quiz/option
pub async fn select_option(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(req): Json<OptionRequest>,
) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let mut quiz = session.lock().await;
  quiz.select_option(&req.option)?;
  Ok(Json(quiz.snapshot()))
}

/// POST /api/quiz/next
pub async fn next_question(State(state): State<AppState>, jar: CookieJar) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let mut quiz = session.lock().await;
  quiz.next_question(&state.services)?;
  Ok(Json(quiz.snapshot()))
}

/// POST /api/quiz/match
pub async fn select_match_pair(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(req): Json<MatchRequest>,
) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let mut quiz = session.lock().await;
  quiz.select_match_pair(&req.word, &req.definition)?;
  Ok(Json(quiz.snapshot()))
}

/// POST /api/quiz/unmatch
pub async fn remove_match(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(req): Json<UnmatchRequest>,
) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let mut quiz = session.lock().await;
  quiz.remove_match(&req.word)?;
  Ok(Json(quiz.snapshot()))
}

/// POST /api/quiz/check
pub async fn check_matches(State(state): State<AppState>, jar: CookieJar) -> Snapshot {
  let (_, session) = current_session(&state, &jar)?;
  let mut quiz = session.lock().await;
  quiz.check_matches(&state.services)?;
  Ok(Json(quiz.snapshot()))
}

/// POST /api/quiz/practice - Replace the finished quiz with a practice round
pub async fn practice_missed(State(state): State<AppState>, jar: CookieJar) -> Snapshot {
  let (session_id, session) = current_session(&state, &jar)?;
  let practice = {
    let mut quiz = session.lock().await;
    quiz.practice_missed()?
  };
  let snapshot = practice.snapshot();
  state.sessions.insert(&session_id, practice);
  Ok(Json(snapshot))
}

/// POST /api/quiz/enhance - Extra explanation of the current word
pub async fn enhance(
  State(state): State<AppState>,
  jar: CookieJar,
  Json(req): Json<EnhanceRequest>,
) -> Result<Json<Enhancement>, ApiError> {
  let kind = EnhancementKind::from_str(&req.kind)
    .ok_or_else(|| ApiError::BadRequest(format!("Unknown enhancement kind '{}'", req.kind)))?;
  let (_, session) = current_session(&state, &jar)?;
  let services = state.services.clone();
  let enhancement = tokio::spawn(async move {
    let quiz = session.lock().await;
    quiz.enhance(kind, &services).await
  })
  .await??;
  Ok(Json(enhancement))
}
