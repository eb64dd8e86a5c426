//! Google Generative Language (Gemini) client.

use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::{
  prompts, AiError, AnswerEvaluator, DefinitionProvider, DistractorGenerator, EnhancementKind,
  Evaluation, ExplanationEnhancer,
};
use crate::config;
use crate::domain::WordKey;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
  http: reqwest::Client,
  api_key: Option<String>,
  model: String,
  base_url: String,
}

// ==================== Wire types ====================

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
  text: Option<String>,
}

impl GenerateContentResponse {
  /// Concatenated text of the first candidate
  fn into_text(self) -> Option<String> {
    let content = self.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() { None } else { Some(text) }
  }
}

#[derive(Deserialize)]
struct DefinitionsOutput {
  definitions: Vec<WordDefinition>,
}

#[derive(Deserialize)]
struct WordDefinition {
  word: String,
  definition: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationOutput {
  is_correct: bool,
  feedback: String,
}

#[derive(Deserialize)]
struct OptionsOutput {
  options: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnhancementOutput {
  enhanced_definition: String,
}

// ==================== Client ====================

impl GeminiClient {
  pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      api_key,
      model: model.into(),
      base_url: API_BASE.to_string(),
    }
  }

  /// Point the client at a different endpoint (proxies, local mocks)
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  pub fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }

  pub fn model(&self) -> &str {
    &self.model
  }

  fn request_body(prompt: &str, schema: Value) -> Value {
    json!({
      "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
      "generationConfig": {
        "responseMimeType": "application/json",
        "responseSchema": schema
      }
    })
  }

  /// Run one prompt and decode the model's JSON reply into `T`
  async fn generate_json<T: DeserializeOwned>(&self, prompt: &str, schema: Value) -> Result<T, AiError> {
    let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

    let resp = self
      .http
      .post(&url)
      .header("x-goog-api-key", api_key)
      .json(&Self::request_body(prompt, schema))
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(AiError::Status(status.as_u16(), body));
    }

    let body: GenerateContentResponse = resp.json().await?;
    let text = body.into_text().ok_or(AiError::EmptyResponse)?;
    tracing::debug!("Gemini replied with {} bytes", text.len());
    Ok(serde_json::from_str(&text)?)
  }
}

fn definitions_by_key(output: DefinitionsOutput) -> HashMap<WordKey, String> {
  output
    .definitions
    .into_iter()
    .filter(|d| !d.definition.trim().is_empty())
    .map(|d| (WordKey::new(&d.word), d.definition.trim().to_string()))
    .collect()
}

fn checked_distractors(output: OptionsOutput) -> Result<Vec<String>, AiError> {
  if output.options.len() != config::DISTRACTOR_COUNT {
    return Err(AiError::InvalidOutput(format!(
      "expected {} distractors, got {}",
      config::DISTRACTOR_COUNT,
      output.options.len()
    )));
  }
  Ok(output.options)
}

impl DefinitionProvider for GeminiClient {
  fn lookup_or_generate<'a>(
    &'a self,
    words: &'a [String],
  ) -> BoxFuture<'a, Result<HashMap<WordKey, String>, AiError>> {
    async move {
      if words.is_empty() {
        return Ok(HashMap::new());
      }
      tracing::debug!("Generating definitions for {} words", words.len());
      let output: DefinitionsOutput = self
        .generate_json(&prompts::definitions(words), prompts::definitions_schema())
        .await?;
      Ok(definitions_by_key(output))
    }
    .boxed()
  }
}

impl AnswerEvaluator for GeminiClient {
  fn evaluate<'a>(
    &'a self,
    word: &'a str,
    correct_definition: &'a str,
    user_answer: &'a str,
  ) -> BoxFuture<'a, Result<Evaluation, AiError>> {
    async move {
      let output: EvaluationOutput = self
        .generate_json(
          &prompts::evaluation(word, correct_definition, user_answer),
          prompts::evaluation_schema(),
        )
        .await?;
      Ok(Evaluation {
        is_correct: output.is_correct,
        feedback: output.feedback,
      })
    }
    .boxed()
  }
}

impl DistractorGenerator for GeminiClient {
  fn generate<'a>(
    &'a self,
    word: &'a str,
    correct_definition: &'a str,
  ) -> BoxFuture<'a, Result<Vec<String>, AiError>> {
    async move {
      let output: OptionsOutput = self
        .generate_json(
          &prompts::distractors(word, correct_definition),
          prompts::distractors_schema(),
        )
        .await?;
      checked_distractors(output)
    }
    .boxed()
  }
}

impl ExplanationEnhancer for GeminiClient {
  fn enhance<'a>(
    &'a self,
    word: &'a str,
    definition: &'a str,
    kind: EnhancementKind,
  ) -> BoxFuture<'a, Result<String, AiError>> {
    async move {
      let output: EnhancementOutput = self
        .generate_json(
          &prompts::enhancement(word, definition, kind),
          prompts::enhancement_schema(),
        )
        .await?;
      Ok(output.enhanced_definition)
    }
    .boxed()
  }
}
