use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Quiz mode, chosen once when a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
  /// Free-text definition, then spell the word (2 points per word)
  #[default]
  DefinitionSpelling,
  /// Free-text definition only
  DefinitionOnly,
  /// Pick the definition among generated options
  MultipleChoice,
  /// Pair every word with its definition, scored in bulk
  Matching,
}

impl QuizMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::DefinitionSpelling => "definition_spelling",
      Self::DefinitionOnly => "definition_only",
      Self::MultipleChoice => "multiple_choice",
      Self::Matching => "matching",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "definition_spelling" => Some(Self::DefinitionSpelling),
      "definition_only" => Some(Self::DefinitionOnly),
      "multiple_choice" => Some(Self::MultipleChoice),
      "matching" => Some(Self::Matching),
      _ => None,
    }
  }

  pub fn has_spelling(&self) -> bool {
    matches!(self, Self::DefinitionSpelling)
  }

  pub fn points_per_word(&self) -> u32 {
    if self.has_spelling() { 2 } else { 1 }
  }

  /// Highest achievable score for a session of `words` words
  pub fn max_score(&self, words: usize) -> u32 {
    words as u32 * self.points_per_word()
  }
}

/// Case-insensitive word identity.
///
/// Trimmed, NFC-normalized and lowercased, so "Café", "cafe\u{301}" and
/// " CAFÉ " all resolve to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordKey(String);

impl WordKey {
  pub fn new(word: &str) -> Self {
    Self(word.trim().nfc().collect::<String>().to_lowercase())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for WordKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// One parsed entry of the word list input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WordEntry {
  /// Needs a definition from the provider
  Bare { word: String },
  /// `word (definition)` - the user supplied the definition
  Custom { word: String, definition: String },
}

impl WordEntry {
  pub fn bare(word: impl Into<String>) -> Self {
    Self::Bare { word: word.into() }
  }

  pub fn custom(word: impl Into<String>, definition: impl Into<String>) -> Self {
    Self::Custom {
      word: word.into(),
      definition: definition.into(),
    }
  }

  pub fn word(&self) -> &str {
    match self {
      Self::Bare { word } | Self::Custom { word, .. } => word,
    }
  }

  pub fn key(&self) -> WordKey {
    WordKey::new(self.word())
  }

  pub fn custom_definition(&self) -> Option<&str> {
    match self {
      Self::Bare { .. } => None,
      Self::Custom { definition, .. } => Some(definition),
    }
  }
}

/// One question of the working list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
  pub word: String,
  pub definition: String,
  /// Multiple-choice options; the definition appears exactly once
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<String>>,
}

impl QuizItem {
  pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
    Self {
      word: word.into(),
      definition: definition.into(),
      options: None,
    }
  }

  pub fn key(&self) -> WordKey {
    WordKey::new(&self.word)
  }
}

/// Outcome of one check on a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
  Unknown,
  Correct,
  Incorrect,
  /// The mode has no such step (spelling outside `definition_spelling`)
  NotApplicable,
}

impl Check {
  pub fn from_bool(correct: bool) -> Self {
    if correct { Self::Correct } else { Self::Incorrect }
  }

  pub fn is_incorrect(&self) -> bool {
    matches!(self, Self::Incorrect)
  }

  /// Correct, or nothing to check
  pub fn passes(&self) -> bool {
    matches!(self, Self::Correct | Self::NotApplicable)
  }

  pub fn points(&self) -> u32 {
    match self {
      Self::Correct => 1,
      _ => 0,
    }
  }
}

/// Per-word outcome for the life of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordResult {
  pub word: String,
  pub definition: String,
  pub definition_correct: Check,
  pub spelling_correct: Check,
}

impl WordResult {
  pub fn new(item: &QuizItem, mode: QuizMode) -> Self {
    Self {
      word: item.word.clone(),
      definition: item.definition.clone(),
      definition_correct: Check::Unknown,
      spelling_correct: Self::initial_spelling(mode),
    }
  }

  fn initial_spelling(mode: QuizMode) -> Check {
    if mode.has_spelling() { Check::Unknown } else { Check::NotApplicable }
  }

  /// Clear both checks before the word is asked again
  pub fn reset(&mut self, mode: QuizMode) {
    self.definition_correct = Check::Unknown;
    self.spelling_correct = Self::initial_spelling(mode);
  }

  pub fn points(&self) -> u32 {
    self.definition_correct.points() + self.spelling_correct.points()
  }

  pub fn is_missed(&self) -> bool {
    self.definition_correct.is_incorrect() || self.spelling_correct.is_incorrect()
  }

  pub fn is_mastered(&self) -> bool {
    self.definition_correct == Check::Correct && self.spelling_correct.passes()
  }
}

/// A user-declared word/definition association (matching mode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
  pub word: String,
  pub definition: String,
}
