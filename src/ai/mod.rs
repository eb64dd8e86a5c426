//! Generative-AI collaborators.
//!
//! The quiz engine only sees the traits in this module. [`GeminiClient`]
//! implements all four against Google's Generative Language API, and
//! [`CachedDefinitions`] puts a persisted look-aside cache in front of any
//! [`DefinitionProvider`].

pub mod cached;
pub mod gemini;
mod prompts;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::WordKey;

pub use cached::{CachedDefinitions, DefinitionStore};
pub use gemini::GeminiClient;

/// Lenient judgment of a free-text definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
  pub is_correct: bool,
  pub feedback: String,
}

/// What kind of extra explanation the learner asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnhancementKind {
  #[serde(rename = "more detail")]
  MoreDetail,
  #[serde(rename = "examples")]
  Examples,
  #[serde(rename = "context")]
  Context,
}

impl EnhancementKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MoreDetail => "more detail",
      Self::Examples => "examples",
      Self::Context => "context",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "more detail" | "more_detail" => Some(Self::MoreDetail),
      "examples" => Some(Self::Examples),
      "context" => Some(Self::Context),
      _ => None,
    }
  }
}

/// Word -> definition lookup. Words absent from the map were not found.
pub trait DefinitionProvider: Send + Sync {
  fn lookup_or_generate<'a>(
    &'a self,
    words: &'a [String],
  ) -> BoxFuture<'a, Result<HashMap<WordKey, String>, AiError>>;
}

pub trait AnswerEvaluator: Send + Sync {
  fn evaluate<'a>(
    &'a self,
    word: &'a str,
    correct_definition: &'a str,
    user_answer: &'a str,
  ) -> BoxFuture<'a, Result<Evaluation, AiError>>;
}

/// Plausible but wrong definitions for multiple-choice options
pub trait DistractorGenerator: Send + Sync {
  fn generate<'a>(
    &'a self,
    word: &'a str,
    correct_definition: &'a str,
  ) -> BoxFuture<'a, Result<Vec<String>, AiError>>;
}

pub trait ExplanationEnhancer: Send + Sync {
  fn enhance<'a>(
    &'a self,
    word: &'a str,
    definition: &'a str,
    kind: EnhancementKind,
  ) -> BoxFuture<'a, Result<String, AiError>>;
}

/// AI provider errors.
#[derive(Debug)]
pub enum AiError {
  /// No API key configured
  MissingApiKey,
  Http(reqwest::Error),
  /// Non-success HTTP status with the response body
  Status(u16, String),
  /// The model returned no candidate text
  EmptyResponse,
  Parse(serde_json::Error),
  /// Well-formed JSON that violates the requested shape
  InvalidOutput(String),
}

impl std::fmt::Display for AiError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AiError::MissingApiKey => write!(f, "AI API key is not configured"),
      AiError::Http(e) => write!(f, "AI request failed: {}", e),
      AiError::Status(code, body) => write!(f, "AI provider returned {}: {}", code, body),
      AiError::EmptyResponse => write!(f, "AI provider returned an empty response"),
      AiError::Parse(e) => write!(f, "Could not parse AI response: {}", e),
      AiError::InvalidOutput(msg) => write!(f, "Unexpected AI output: {}", msg),
    }
  }
}

impl AiError {
  /// Returns a user-facing error message without exposing provider details.
  pub fn user_message(&self) -> &'static str {
    match self {
      AiError::MissingApiKey => "The AI service is not configured",
      AiError::Http(_) | AiError::Status(_, _) => "The AI service is unavailable right now",
      AiError::EmptyResponse | AiError::Parse(_) | AiError::InvalidOutput(_) => {
        "The AI service returned an unusable answer"
      }
    }
  }
}

impl std::error::Error for AiError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      AiError::Http(e) => Some(e),
      AiError::Parse(e) => Some(e),
      _ => None,
    }
  }
}

impl From<reqwest::Error> for AiError {
  fn from(e: reqwest::Error) -> Self {
    AiError::Http(e)
  }
}

impl From<serde_json::Error> for AiError {
  fn from(e: serde_json::Error) -> Self {
    AiError::Parse(e)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_enhancement_kind_serde_names() {
    let json = serde_json::to_string(&EnhancementKind::MoreDetail).unwrap();
    assert_eq!(json, "\"more detail\"");
    let kind: EnhancementKind = serde_json::from_str("\"examples\"").unwrap();
    assert_eq!(kind, EnhancementKind::Examples);
  }

  #[test]
  fn test_enhancement_kind_from_str() {
    assert_eq!(EnhancementKind::from_str("more_detail"), Some(EnhancementKind::MoreDetail));
    assert_eq!(EnhancementKind::from_str("context"), Some(EnhancementKind::Context));
    assert_eq!(EnhancementKind::from_str("history"), None);
  }

  #[test]
  fn test_user_message_hides_details() {
    let err = AiError::Status(500, "internal stack trace".into());
    assert!(!err.user_message().contains("stack"));
    assert!(err.to_string().contains("500"));
  }
}
