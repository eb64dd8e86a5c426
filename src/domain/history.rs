use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::quiz::{WordEntry, WordKey};

/// One finished attempt at a word set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
  pub score: u32,
  pub total: u32,
}

impl Attempt {
  pub fn new(score: u32, total: u32) -> Self {
    Self { score, total }
  }
}

/// Identity of a word set, independent of entry order and case.
///
/// Entries are normalized (word key, trimmed custom definition), sorted,
/// deduplicated, serialized as a JSON array and hashed with SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordSetKey(String);

impl WordSetKey {
  pub fn from_entries(entries: &[WordEntry]) -> Self {
    let mut canonical: Vec<String> = entries.iter().map(canonical_entry).collect();
    canonical.sort();
    canonical.dedup();

    // a Vec<String> always serializes
    let json = serde_json::to_string(&canonical).unwrap_or_default();
    Self(hex::encode(Sha256::digest(json.as_bytes())))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for WordSetKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

fn canonical_entry(entry: &WordEntry) -> String {
  match entry {
    WordEntry::Bare { word } => WordKey::new(word).to_string(),
    WordEntry::Custom { word, definition } => {
      format!("{} ({})", WordKey::new(word), definition.trim())
    }
  }
}

/// A persisted word set together with its score history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastQuiz {
  pub entries: Vec<WordEntry>,
  pub history: Vec<Attempt>,
}

impl PastQuiz {
  pub fn new(entries: Vec<WordEntry>) -> Self {
    Self {
      entries,
      history: Vec::new(),
    }
  }

  pub fn key(&self) -> WordSetKey {
    WordSetKey::from_entries(&self.entries)
  }
}
