//! Score history keyed by word set.
//!
//! A bounded, most-recently-used list of [`PastQuiz`] entries. Starting a
//! quiz promotes (or creates) its word set; finishing one appends an
//! [`Attempt`].

pub mod memory;
pub mod sqlite;

use crate::db::StoreError;
use crate::domain::{Attempt, PastQuiz, WordEntry, WordSetKey};

pub use memory::MemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

pub trait HistoryStore: Send + Sync {
  fn get(&self, key: &WordSetKey) -> Result<Option<PastQuiz>, StoreError>;
  /// Insert or replace, and mark as most recently used
  fn put(&self, key: &WordSetKey, quiz: &PastQuiz) -> Result<(), StoreError>;
  /// Append one attempt in a single step, creating the entry from `entries`
  /// if absent, and mark it most recently used. Returns the updated entry.
  fn append_attempt(
    &self,
    key: &WordSetKey,
    entries: &[WordEntry],
    attempt: Attempt,
  ) -> Result<PastQuiz, StoreError>;
  fn remove(&self, key: &WordSetKey) -> Result<(), StoreError>;
  /// All entries, most recently used first
  fn list(&self) -> Result<Vec<PastQuiz>, StoreError>;
}

/// Promote the word set to most recently used, creating it if absent.
///
/// Returns the stored entry so the caller can seed its score history.
pub fn record_session_start(
  store: &dyn HistoryStore,
  entries: &[WordEntry],
  cap: usize,
) -> Result<PastQuiz, StoreError> {
  let key = WordSetKey::from_entries(entries);
  let quiz = match store.get(&key)? {
    Some(existing) => existing,
    None => PastQuiz::new(entries.to_vec()),
  };
  store.put(&key, &quiz)?;
  evict_beyond(store, cap)?;
  Ok(quiz)
}

/// Append a finished attempt to the word set's history
pub fn record_attempt(
  store: &dyn HistoryStore,
  entries: &[WordEntry],
  attempt: Attempt,
  cap: usize,
) -> Result<PastQuiz, StoreError> {
  let key = WordSetKey::from_entries(entries);
  let quiz = store.append_attempt(&key, entries, attempt)?;
  evict_beyond(store, cap)?;
  Ok(quiz)
}

fn evict_beyond(store: &dyn HistoryStore, cap: usize) -> Result<(), StoreError> {
  for stale in store.list()?.into_iter().skip(cap) {
    let key = stale.key();
    tracing::debug!("Evicting word set {} from history", key);
    store.remove(&key)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bare(words: &[&str]) -> Vec<WordEntry> {
    words.iter().map(|w| WordEntry::bare(*w)).collect()
  }

  #[test]
  fn test_history_survives_reordered_word_set() {
    let store = MemoryHistoryStore::new();
    let first = bare(&["alpha", "beta", "gamma"]);

    record_session_start(&store, &first, 5).unwrap();
    record_attempt(&store, &first, Attempt::new(2, 3), 5).unwrap();

    let reordered = bare(&["Gamma", "alpha", "beta"]);
    let loaded = record_session_start(&store, &reordered, 5).unwrap();
    assert_eq!(loaded.history, vec![Attempt::new(2, 3)]);
    assert_eq!(store.list().unwrap().len(), 1);
  }

  #[test]
  fn test_sixth_word_set_evicts_least_recent() {
    let store = MemoryHistoryStore::new();
    for i in 0..5 {
      record_session_start(&store, &bare(&[&format!("word{}", i)]), 5).unwrap();
    }
    // word0 is touched again, so word1 becomes least recently used
    record_session_start(&store, &bare(&["word0"]), 5).unwrap();
    record_session_start(&store, &bare(&["word5"]), 5).unwrap();

    let words: Vec<String> = store
      .list()
      .unwrap()
      .iter()
      .map(|q| q.entries[0].word().to_string())
      .collect();
    assert_eq!(words, vec!["word5", "word0", "word4", "word3", "word2"]);
  }

  #[test]
  fn test_attempt_recreates_evicted_entry() {
    let store = MemoryHistoryStore::new();
    let entries = bare(&["alpha"]);
    let quiz = record_attempt(&store, &entries, Attempt::new(1, 1), 5).unwrap();
    assert_eq!(quiz.history.len(), 1);
    assert_eq!(store.get(&WordSetKey::from_entries(&entries)).unwrap(), Some(quiz));
  }

  #[test]
  fn test_concurrent_sessions_both_record_attempts() {
    let store = MemoryHistoryStore::new();
    let entries = bare(&["alpha", "beta"]);
    // Two sessions on the same word set, both started before either finished
    record_session_start(&store, &entries, 5).unwrap();
    record_session_start(&store, &entries, 5).unwrap();

    record_attempt(&store, &entries, Attempt::new(2, 2), 5).unwrap();
    let quiz = record_attempt(&store, &entries, Attempt::new(0, 2), 5).unwrap();
    assert_eq!(quiz.history, vec![Attempt::new(2, 2), Attempt::new(0, 2)]);
  }
}
