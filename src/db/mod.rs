pub mod definitions;
pub mod schema;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use definitions::SqliteDefinitionStore;
pub use schema::run_migrations;

pub type DbPool = Arc<Mutex<Connection>>;

/// Logs a failed result at warn level instead of propagating it.
///
/// Used where a store failure must not break the quiz flow (history writes,
/// definition cache fills).
pub trait LogOnError<T> {
  fn log_warn(self, context: &str) -> Option<T>;

  fn log_warn_default(self, context: &str) -> T
  where
    Self: Sized,
    T: Default,
  {
    self.log_warn(context).unwrap_or_default()
  }
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    self
      .map_err(|e| tracing::warn!(context, error = %e, "store operation failed"))
      .ok()
  }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database unavailable")
  }
}

impl std::error::Error for DbLockError {}

/// Errors from the persisted stores (history, definition cache)
#[derive(Debug)]
pub enum StoreError {
  Unavailable,
  Database(rusqlite::Error),
  /// A stored row could not be decoded
  Corrupt(String),
}

impl std::fmt::Display for StoreError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      StoreError::Unavailable => write!(f, "Database unavailable"),
      StoreError::Database(e) => write!(f, "Database error: {}", e),
      StoreError::Corrupt(msg) => write!(f, "Corrupt stored data: {}", msg),
    }
  }
}

impl std::error::Error for StoreError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      StoreError::Database(e) => Some(e),
      _ => None,
    }
  }
}

impl From<DbLockError> for StoreError {
  fn from(_: DbLockError) -> Self {
    StoreError::Unavailable
  }
}

impl From<rusqlite::Error> for StoreError {
  fn from(e: rusqlite::Error) -> Self {
    StoreError::Database(e)
  }
}

impl From<serde_json::Error> for StoreError {
  fn from(e: serde_json::Error) -> Self {
    StoreError::Corrupt(e.to_string())
  }
}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory database with the full schema (tests, ephemeral runs)
pub fn init_memory_db() -> Result<DbPool> {
  let conn = Connection::open_in_memory()?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Reachability check for the status endpoint
pub fn ping(pool: &DbPool) -> bool {
  match try_lock(pool) {
    Ok(conn) => conn
      .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
      .is_ok(),
    Err(_) => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_init_db_creates_parent_dirs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("vocab.db");
    let pool = init_db(&path).unwrap();
    assert!(path.exists());
    assert!(ping(&pool));
  }

  #[test]
  fn test_log_warn_default_swallows_error() {
    let result: std::result::Result<Vec<i32>, DbLockError> = Err(DbLockError);
    assert!(result.log_warn_default("ignored").is_empty());

    let ok: std::result::Result<i32, DbLockError> = Ok(3);
    assert_eq!(ok.log_warn("ignored"), Some(3));
  }
}
