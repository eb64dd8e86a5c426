//! Prompt text and JSON response schemas for each AI task.

use serde_json::{json, Value};

use super::EnhancementKind;
use crate::config;

pub(super) fn definitions(words: &[String]) -> String {
  let list = words
    .iter()
    .map(|w| format!("- {}", w))
    .collect::<Vec<_>>()
    .join("\n");
  format!(
    "You are an expert vocabulary tutor. Give a clear, concise definition for each \
     of the following words or phrases. Use the word exactly as written in the \
     \"word\" field.\n\n{}",
    list
  )
}

pub(super) fn definitions_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "definitions": {
        "type": "ARRAY",
        "items": {
          "type": "OBJECT",
          "properties": {
            "word": { "type": "STRING" },
            "definition": { "type": "STRING" }
          },
          "required": ["word", "definition"]
        }
      }
    },
    "required": ["definitions"]
  })
}

pub(super) fn evaluation(word: &str, correct_definition: &str, user_answer: &str) -> String {
  format!(
    "You are a helpful quiz assistant checking a learner's definition of a vocabulary \
     word. Be lenient: if the answer captures the main idea of the definition, it is \
     correct. Reply with a short, encouraging piece of feedback.\n\n\
     Word: {}\nCorrect definition: {}\nLearner's answer: {}",
    word, correct_definition, user_answer
  )
}

pub(super) fn evaluation_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "isCorrect": { "type": "BOOLEAN" },
      "feedback": { "type": "STRING" }
    },
    "required": ["isCorrect", "feedback"]
  })
}

pub(super) fn distractors(word: &str, correct_definition: &str) -> String {
  format!(
    "You are a helpful quiz assistant. Write exactly {} plausible but incorrect \
     definitions for the vocabulary word below, to be used as multiple-choice options. \
     None of them may repeat the correct definition or define a synonym of the word. \
     Keep each option similar in length and style to the correct definition.\n\n\
     Word: {}\nCorrect definition: {}",
    config::DISTRACTOR_COUNT,
    word,
    correct_definition
  )
}

pub(super) fn distractors_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "options": {
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "minItems": config::DISTRACTOR_COUNT,
        "maxItems": config::DISTRACTOR_COUNT
      }
    },
    "required": ["options"]
  })
}

pub(super) fn enhancement(word: &str, definition: &str, kind: EnhancementKind) -> String {
  format!(
    "You are an expert vocabulary tutor helping a student understand the word '{}'.\n\
     The current definition is: {}\n\
     The student asked for {} to understand the word better.\n\
     The student's level and goals: {}\n\n\
     Write the enhanced explanation.",
    word,
    definition,
    kind.as_str(),
    config::LEARNER_DETAILS
  )
}

pub(super) fn enhancement_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "enhancedDefinition": { "type": "STRING" }
    },
    "required": ["enhancedDefinition"]
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_definitions_prompt_lists_every_word() {
    let prompt = definitions(&["ephemeral".to_string(), "red herring".to_string()]);
    assert!(prompt.contains("- ephemeral"));
    assert!(prompt.contains("- red herring"));
  }

  #[test]
  fn test_enhancement_prompt_names_kind() {
    let prompt = enhancement("terse", "brief", EnhancementKind::MoreDetail);
    assert!(prompt.contains("more detail"));
    assert!(prompt.contains(config::LEARNER_DETAILS));
  }
}
