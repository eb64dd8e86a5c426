use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::HistoryStore;
use crate::db::{try_lock, DbPool, StoreError};
use crate::domain::{Attempt, PastQuiz, WordEntry, WordSetKey};

/// History persisted in `past_quizzes` / `quiz_attempts`.
///
/// `put` replaces the stored attempts, but rows that already match the new
/// history are left in place so they keep their `recorded_at`.
#[derive(Clone)]
pub struct SqliteHistoryStore {
  pool: DbPool,
}

impl SqliteHistoryStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }
}

fn load_attempts(conn: &Connection, key: &str) -> rusqlite::Result<Vec<Attempt>> {
  let mut stmt = conn.prepare(
    "SELECT score, total FROM quiz_attempts WHERE quiz_key = ?1 ORDER BY id",
  )?;
  let rows = stmt.query_map(params![key], |row| {
    Ok(Attempt::new(row.get(0)?, row.get(1)?))
  })?;
  rows.collect()
}

/// Insert the word set or bump it to most recently used.
/// Stored entries are only overwritten when `replace_entries` is set.
fn touch_quiz(conn: &Connection, key: &str, entries: &str, replace_entries: bool, now: &str) -> rusqlite::Result<()> {
  let sql = if replace_entries {
    r#"
    INSERT INTO past_quizzes (quiz_key, entries, recency, created_at, last_used_at)
    VALUES (?1, ?2, (SELECT COALESCE(MAX(recency), 0) + 1 FROM past_quizzes), ?3, ?3)
    ON CONFLICT(quiz_key) DO UPDATE SET
      entries = excluded.entries,
      recency = excluded.recency,
      last_used_at = excluded.last_used_at
    "#
  } else {
    r#"
    INSERT INTO past_quizzes (quiz_key, entries, recency, created_at, last_used_at)
    VALUES (?1, ?2, (SELECT COALESCE(MAX(recency), 0) + 1 FROM past_quizzes), ?3, ?3)
    ON CONFLICT(quiz_key) DO UPDATE SET
      recency = excluded.recency,
      last_used_at = excluded.last_used_at
    "#
  };
  conn.execute(sql, params![key, entries, now])?;
  Ok(())
}

fn insert_attempt(conn: &Connection, key: &str, attempt: &Attempt, now: &str) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO quiz_attempts (quiz_key, score, total, recorded_at) VALUES (?1, ?2, ?3, ?4)",
    params![key, attempt.score, attempt.total, now],
  )?;
  Ok(())
}

fn decode_entries(raw: &str) -> Result<Vec<WordEntry>, StoreError> {
  Ok(serde_json::from_str(raw)?)
}

impl HistoryStore for SqliteHistoryStore {
  fn get(&self, key: &WordSetKey) -> Result<Option<PastQuiz>, StoreError> {
    let conn = try_lock(&self.pool)?;
    let raw: Option<String> = conn
      .query_row(
        "SELECT entries FROM past_quizzes WHERE quiz_key = ?1",
        params![key.as_str()],
        |row| row.get(0),
      )
      .optional()?;

    match raw {
      Some(raw) => Ok(Some(PastQuiz {
        entries: decode_entries(&raw)?,
        history: load_attempts(&conn, key.as_str())?,
      })),
      None => Ok(None),
    }
  }

  fn put(&self, key: &WordSetKey, quiz: &PastQuiz) -> Result<(), StoreError> {
    let entries = serde_json::to_string(&quiz.entries)?;
    let now = Utc::now().to_rfc3339();

    let mut conn = try_lock(&self.pool)?;
    let tx = conn.transaction()?;
    touch_quiz(&tx, key.as_str(), &entries, true, &now)?;

    let stored = load_attempts(&tx, key.as_str())?;
    let keep = stored
      .iter()
      .zip(&quiz.history)
      .take_while(|(old, new)| old == new)
      .count();
    if keep < stored.len() {
      tx.execute(
        r#"
        DELETE FROM quiz_attempts WHERE quiz_key = ?1 AND id NOT IN (
          SELECT id FROM quiz_attempts WHERE quiz_key = ?1 ORDER BY id LIMIT ?2
        )
        "#,
        params![key.as_str(), keep as i64],
      )?;
    }
    for attempt in &quiz.history[keep..] {
      insert_attempt(&tx, key.as_str(), attempt, &now)?;
    }
    tx.commit()?;
    Ok(())
  }

  fn append_attempt(
    &self,
    key: &WordSetKey,
    entries: &[WordEntry],
    attempt: Attempt,
  ) -> Result<PastQuiz, StoreError> {
    let encoded = serde_json::to_string(entries)?;
    let now = Utc::now().to_rfc3339();

    let mut conn = try_lock(&self.pool)?;
    let tx = conn.transaction()?;
    touch_quiz(&tx, key.as_str(), &encoded, false, &now)?;
    insert_attempt(&tx, key.as_str(), &attempt, &now)?;

    let raw: String = tx.query_row(
      "SELECT entries FROM past_quizzes WHERE quiz_key = ?1",
      params![key.as_str()],
      |row| row.get(0),
    )?;
    let quiz = PastQuiz {
      entries: decode_entries(&raw)?,
      history: load_attempts(&tx, key.as_str())?,
    };
    tx.commit()?;
    Ok(quiz)
  }

  fn remove(&self, key: &WordSetKey) -> Result<(), StoreError> {
    let mut conn = try_lock(&self.pool)?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM quiz_attempts WHERE quiz_key = ?1", params![key.as_str()])?;
    tx.execute("DELETE FROM past_quizzes WHERE quiz_key = ?1", params![key.as_str()])?;
    tx.commit()?;
    Ok(())
  }

  fn list(&self) -> Result<Vec<PastQuiz>, StoreError> {
    let conn = try_lock(&self.pool)?;
    let mut stmt = conn.prepare("SELECT quiz_key, entries FROM past_quizzes ORDER BY recency DESC")?;
    let rows: Vec<(String, String)> = stmt
      .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
      .collect::<rusqlite::Result<_>>()?;

    rows
      .into_iter()
      .map(|(key, raw)| -> Result<PastQuiz, StoreError> {
        Ok(PastQuiz {
          entries: decode_entries(&raw)?,
          history: load_attempts(&conn, &key)?,
        })
      })
      .collect()
  }
}
