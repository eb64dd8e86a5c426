//! Simple in-memory session storage for quiz sessions.
//!
//! Stores QuizSession state keyed by session ID (from cookie).
//! Sessions auto-expire after a configurable duration of inactivity.

use crate::config;
use crate::engine::QuizSession;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One quiz, locked for the whole of each command
pub type SharedSession = Arc<tokio::sync::Mutex<QuizSession>>;

/// Session entry with last access time for expiration
struct SessionEntry {
  session: SharedSession,
  last_access: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
  sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
    // Entries are replaced whole, so a poisoned map is still usable
    self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Look up a session and refresh its expiry
  pub fn get(&self, session_id: &str) -> Option<SharedSession> {
    let mut sessions = self.lock();

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      cleanup_expired(&mut sessions);
    }

    sessions.get_mut(session_id).map(|entry| {
      entry.last_access = Utc::now();
      entry.session.clone()
    })
  }

  /// Insert or replace the session for this ID
  pub fn insert(&self, session_id: &str, session: QuizSession) -> SharedSession {
    let shared = Arc::new(tokio::sync::Mutex::new(session));
    self.lock().insert(
      session_id.to_string(),
      SessionEntry {
        session: shared.clone(),
        last_access: Utc::now(),
      },
    );
    shared
  }

  pub fn remove(&self, session_id: &str) {
    self.lock().remove(session_id);
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>) {
  let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);
  let before = sessions.len();
  sessions.retain(|_, entry| entry.last_access > expiry);
  if sessions.len() < before {
    tracing::debug!("Expired {} quiz session(s)", before - sessions.len());
  }
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::QuizMode;
  use crate::testing::{seeded_rng, FakeAi, TestServices};

  #[test]
  fn test_session_id_shape() {
    let id = generate_session_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_ne!(id, generate_session_id());
  }

  #[tokio::test]
  async fn test_insert_get_remove() {
    let env = TestServices::new(FakeAi::default());
    let quiz = QuizSession::start("alpha", QuizMode::DefinitionOnly, &env.services, seeded_rng(1))
      .await
      .unwrap();

    let store = SessionStore::new();
    store.insert("abc", quiz);
    assert!(store.get("abc").is_some());
    assert!(store.get("missing").is_none());

    store.remove("abc");
    assert!(store.is_empty());
  }

  #[tokio::test]
  async fn test_stale_entries_are_expired() {
    let env = TestServices::new(FakeAi::default());
    let quiz = QuizSession::start("alpha", QuizMode::DefinitionOnly, &env.services, seeded_rng(1))
      .await
      .unwrap();

    let store = SessionStore::new();
    store.insert("old", quiz);
    {
      let mut sessions = store.lock();
      sessions.get_mut("old").unwrap().last_access =
        Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS + 1);
      cleanup_expired(&mut sessions);
    }
    assert!(store.is_empty());
  }
}
