use std::sync::{Mutex, MutexGuard};

use super::HistoryStore;
use crate::db::StoreError;
use crate::domain::{Attempt, PastQuiz, WordEntry, WordSetKey};

/// Process-local history, most recently used at index 0
#[derive(Default)]
pub struct MemoryHistoryStore {
  entries: Mutex<Vec<(WordSetKey, PastQuiz)>>,
}

impl MemoryHistoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Vec<(WordSetKey, PastQuiz)>> {
    // The list is rewritten whole on every put, so a poisoned guard is still consistent
    self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl HistoryStore for MemoryHistoryStore {
  fn get(&self, key: &WordSetKey) -> Result<Option<PastQuiz>, StoreError> {
    Ok(self.lock().iter().find(|(k, _)| k == key).map(|(_, q)| q.clone()))
  }

  fn put(&self, key: &WordSetKey, quiz: &PastQuiz) -> Result<(), StoreError> {
    let mut entries = self.lock();
    entries.retain(|(k, _)| k != key);
    entries.insert(0, (key.clone(), quiz.clone()));
    Ok(())
  }

  fn append_attempt(
    &self,
    key: &WordSetKey,
    entries: &[WordEntry],
    attempt: Attempt,
  ) -> Result<PastQuiz, StoreError> {
    let mut list = self.lock();
    let mut quiz = match list.iter().position(|(k, _)| k == key) {
      Some(index) => list.remove(index).1,
      None => PastQuiz::new(entries.to_vec()),
    };
    quiz.history.push(attempt);
    list.insert(0, (key.clone(), quiz.clone()));
    Ok(quiz)
  }

  fn remove(&self, key: &WordSetKey) -> Result<(), StoreError> {
    self.lock().retain(|(k, _)| k != key);
    Ok(())
  }

  fn list(&self) -> Result<Vec<PastQuiz>, StoreError> {
    Ok(self.lock().iter().map(|(_, q)| q.clone()).collect())
  }
}
