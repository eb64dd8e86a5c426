use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS past_quizzes (
      quiz_key TEXT PRIMARY KEY,
      -- JSON array of word entries, in the order first submitted
      entries TEXT NOT NULL,
      -- higher = more recently used
      recency INTEGER NOT NULL,
      created_at TEXT NOT NULL,
      last_used_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS quiz_attempts (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      quiz_key TEXT NOT NULL,
      score INTEGER NOT NULL,
      total INTEGER NOT NULL,
      recorded_at TEXT NOT NULL,
      FOREIGN KEY (quiz_key) REFERENCES past_quizzes(quiz_key)
    );

    CREATE TABLE IF NOT EXISTS definitions (
      word_key TEXT PRIMARY KEY,
      definition TEXT NOT NULL,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_past_quizzes_recency ON past_quizzes(recency);
    CREATE INDEX IF NOT EXISTS idx_quiz_attempts_key ON quiz_attempts(quiz_key);
    "#,
  )?;

  Ok(())
}
