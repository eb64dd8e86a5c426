use futures::future::try_join_all;
use indexmap::IndexMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use super::error::{CommandError, StartError};
use super::matching::MatchBoard;
use super::options::build_options;
use super::QuizServices;
use crate::ai::EnhancementKind;
use crate::config;
use crate::db::LogOnError;
use crate::domain::{Attempt, Check, QuizItem, QuizMode, WordEntry, WordKey, WordResult};
use crate::history::{record_attempt, record_session_start};
use crate::parsing::{dedup_entries, parse_word_list};

/// Top-level phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
  /// Sequential questions
  Quiz,
  /// Matching board is open
  Matching,
  Results,
  /// Every practiced word has been answered correctly
  PracticeComplete,
}

/// Sub-state of the current question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPhase {
  Answering,
  /// An evaluator call is in flight
  Evaluating,
  /// The evaluator failed; the learner marks the answer themselves
  ManualEvaluation,
  Spelling,
  Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
  Regular,
  /// Retrying the missed words of a finished session
  Practice,
}

/// Extra explanation for the current word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enhancement {
  pub word: String,
  pub kind: EnhancementKind,
  pub content: String,
}

pub struct QuizSession {
  pub(super) mode: QuizMode,
  pub(super) kind: SessionKind,
  pub(super) phase: SessionPhase,
  /// Deduplicated entries as submitted; the history identity
  pub(super) entries: Vec<WordEntry>,
  /// Working list, shuffled once at start
  pub(super) items: Vec<QuizItem>,
  /// Current item of a regular session
  pub(super) index: usize,
  /// Remaining practice pool, current item at the front
  pub(super) queue: VecDeque<usize>,
  /// Questions presented so far in practice
  pub(super) asked: usize,
  pub(super) results: IndexMap<WordKey, WordResult>,
  pub(super) answer_phase: AnswerPhase,
  pub(super) answer: String,
  pub(super) spelling: String,
  pub(super) feedback: Option<String>,
  pub(super) board: Option<MatchBoard>,
  /// Prior attempts at this word set plus the ones made here
  pub(super) history: Vec<Attempt>,
  rng: StdRng,
}

impl QuizSession {
  /// Parse `input`, resolve definitions and open a session in `mode`
  pub async fn start(
    input: &str,
    mode: QuizMode,
    services: &QuizServices,
    mut rng: StdRng,
  ) -> Result<Self, StartError> {
    let entries = dedup_entries(parse_word_list(input));
    if entries.is_empty() {
      return Err(StartError::EmptyWordList);
    }

    let definitions = resolve_definitions(&entries, services).await;
    let mut items: Vec<QuizItem> = entries
      .iter()
      .map(|entry| {
        let definition = match entry.custom_definition() {
          Some(custom) => custom.to_string(),
          None => definitions
            .get(&entry.key())
            .cloned()
            .unwrap_or_else(|| config::MISSING_DEFINITION.to_string()),
        };
        QuizItem::new(entry.word(), definition)
      })
      .collect();
    items.shuffle(&mut rng);

    if mode == QuizMode::MultipleChoice {
      attach_options(&mut items, services, &mut rng).await?;
    }

    let (phase, board) = if mode == QuizMode::Matching {
      (SessionPhase::Matching, Some(MatchBoard::new(&items, &mut rng)))
    } else {
      (SessionPhase::Quiz, None)
    };

    let history = record_session_start(services.history.as_ref(), &entries, services.history_cap)
      .map(|quiz| quiz.history)
      .log_warn_default("Failed to record quiz start");

    let results = items
      .iter()
      .map(|item| (item.key(), WordResult::new(item, mode)))
      .collect();

    tracing::info!(
      "Started {} quiz with {} word(s), {} prior attempt(s)",
      mode.as_str(),
      items.len(),
      history.len()
    );

    Ok(Self {
      mode,
      kind: SessionKind::Regular,
      phase,
      entries,
      items,
      index: 0,
      queue: VecDeque::new(),
      asked: 0,
      results,
      answer_phase: AnswerPhase::Answering,
      answer: String::new(),
      spelling: String::new(),
      feedback: None,
      board,
      history,
      rng,
    })
  }

  pub fn mode(&self) -> QuizMode {
    self.mode
  }

  pub fn kind(&self) -> SessionKind {
    self.kind
  }

  pub fn phase(&self) -> SessionPhase {
    self.phase
  }

  pub fn answer_phase(&self) -> AnswerPhase {
    self.answer_phase
  }

  pub fn items(&self) -> &[QuizItem] {
    &self.items
  }

  pub fn results(&self) -> &IndexMap<WordKey, WordResult> {
    &self.results
  }

  pub fn history(&self) -> &[Attempt] {
    &self.history
  }

  /// Index into `items` of the question being asked
  pub(super) fn current_index(&self) -> Option<usize> {
    if self.phase != SessionPhase::Quiz {
      return None;
    }
    match self.kind {
      SessionKind::Regular => Some(self.index),
      SessionKind::Practice => self.queue.front().copied(),
    }
  }

  pub fn current_item(&self) -> Option<&QuizItem> {
    self.current_index().map(|i| &self.items[i])
  }

  /// Sum of per-word points so far
  pub fn score(&self) -> u32 {
    self.results.values().map(WordResult::points).sum()
  }

  pub fn max_score(&self) -> u32 {
    self.mode.max_score(self.items.len())
  }

  // ==================== Guards ====================

  fn sequential(&self, command: &'static str) -> Result<usize, CommandError> {
    if self.mode == QuizMode::Matching {
      return Err(CommandError::WrongMode { command });
    }
    self.current_index().ok_or(CommandError::WrongPhase { command })
  }

  fn expect_answer_phase(&self, expected: AnswerPhase, command: &'static str) -> Result<(), CommandError> {
    if self.answer_phase == expected {
      Ok(())
    } else {
      Err(CommandError::WrongPhase { command })
    }
  }

  fn matching_board(&mut self, command: &'static str) -> Result<&mut MatchBoard, CommandError> {
    self.matching_parts(command).map(|(board, _)| board)
  }

  /// The board alongside the results it scores into
  fn matching_parts(
    &mut self,
    command: &'static str,
  ) -> Result<(&mut MatchBoard, &mut IndexMap<WordKey, WordResult>), CommandError> {
    if self.mode != QuizMode::Matching {
      return Err(CommandError::WrongMode { command });
    }
    if self.phase != SessionPhase::Matching {
      return Err(CommandError::WrongPhase { command });
    }
    let board = self.board.as_mut().ok_or(CommandError::WrongMode { command })?;
    Ok((board, &mut self.results))
  }

  fn result_mut(&mut self, index: usize) -> &mut WordResult {
    let key = self.items[index].key();
    let mode = self.mode;
    let item = &self.items[index];
    self
      .results
      .entry(key)
      .or_insert_with(|| WordResult::new(item, mode))
  }

  // ==================== Sequential commands ====================

  /// Submit a free-text definition for evaluation.
  ///
  /// A blank answer is rejected before the evaluator is called. When the
  /// evaluator fails the question moves to manual evaluation.
  pub async fn submit_answer(&mut self, answer: &str, services: &QuizServices) -> Result<(), CommandError> {
    let index = self.sequential("submit_answer")?;
    if self.mode == QuizMode::MultipleChoice {
      return Err(CommandError::WrongMode { command: "submit_answer" });
    }
    self.expect_answer_phase(AnswerPhase::Answering, "submit_answer")?;
    let trimmed = answer.trim();
    if trimmed.is_empty() {
      return Err(CommandError::EmptyAnswer);
    }

    self.answer = answer.to_string();
    self.answer_phase = AnswerPhase::Evaluating;

    let item = &self.items[index];
    match services.evaluator.evaluate(&item.word, &item.definition, trimmed).await {
      Ok(evaluation) => {
        tracing::debug!("Evaluated '{}': correct={}", item.word, evaluation.is_correct);
        self.feedback = Some(evaluation.feedback);
        self.record_definition(index, evaluation.is_correct);
      }
      Err(e) => {
        tracing::warn!("Answer evaluation failed, falling back to manual: {}", e);
        self.answer_phase = AnswerPhase::ManualEvaluation;
      }
    }
    Ok(())
  }

  /// Learner's own verdict after the evaluator failed
  pub fn mark_definition(&mut self, correct: bool) -> Result<(), CommandError> {
    let index = self.sequential("mark_definition")?;
    self.expect_answer_phase(AnswerPhase::ManualEvaluation, "mark_definition")?;
    self.record_definition(index, correct);
    Ok(())
  }

  fn record_definition(&mut self, index: usize, correct: bool) {
    self.result_mut(index).definition_correct = Check::from_bool(correct);
    self.answer_phase = if self.mode.has_spelling() {
      AnswerPhase::Spelling
    } else {
      AnswerPhase::Done
    };
  }

  /// Spell the word. Blank input is accepted and scored incorrect.
  pub fn submit_spelling(&mut self, spelling: &str) -> Result<(), CommandError> {
    let index = self.sequential("submit_spelling")?;
    self.expect_answer_phase(AnswerPhase::Spelling, "submit_spelling")?;

    let correct = WordKey::new(spelling) == self.items[index].key();
    self.spelling = spelling.to_string();
    self.result_mut(index).spelling_correct = Check::from_bool(correct);
    self.answer_phase = AnswerPhase::Done;
    Ok(())
  }

  pub fn select_option(&mut self, option: &str) -> Result<(), CommandError> {
    let index = self.sequential("select_option")?;
    if self.mode != QuizMode::MultipleChoice {
      return Err(CommandError::WrongMode { command: "select_option" });
    }
    self.expect_answer_phase(AnswerPhase::Answering, "select_option")?;

    let item = &self.items[index];
    let offered = item
      .options
      .as_ref()
      .is_some_and(|options| options.iter().any(|o| o == option));
    if !offered {
      return Err(CommandError::UnknownOption);
    }

    let correct = option == item.definition;
    self.answer = option.to_string();
    self.record_definition(index, correct);
    Ok(())
  }

  /// Advance to the next question, or finish the session
  pub fn next_question(&mut self, services: &QuizServices) -> Result<(), CommandError> {
    let index = self.sequential("next_question")?;
    self.expect_answer_phase(AnswerPhase::Done, "next_question")?;

    match self.kind {
      SessionKind::Regular => {
        if index + 1 < self.items.len() {
          self.index += 1;
          self.clear_answer();
        } else {
          let attempt = Attempt::new(self.score(), self.max_score());
          self.finish(attempt, services);
        }
      }
      SessionKind::Practice => {
        self.queue.pop_front();
        if !self.result_mut(index).is_mastered() {
          self.queue.push_back(index);
        }
        match self.queue.front().copied() {
          Some(next) => {
            let mode = self.mode;
            self.result_mut(next).reset(mode);
            self.asked += 1;
            self.clear_answer();
          }
          None => {
            tracing::info!("Practice complete after {} question(s)", self.asked + 1);
            self.phase = SessionPhase::PracticeComplete;
            self.clear_answer();
          }
        }
      }
    }
    Ok(())
  }

  fn clear_answer(&mut self) {
    self.answer_phase = AnswerPhase::Answering;
    self.answer.clear();
    self.spelling.clear();
    self.feedback = None;
  }

  /// Close a regular session and append the attempt to its history
  fn finish(&mut self, attempt: Attempt, services: &QuizServices) {
    self.phase = SessionPhase::Results;
    self.answer_phase = AnswerPhase::Done;
    self.history.push(attempt);
    tracing::info!(
      "Finished {} quiz: {}/{}",
      self.mode.as_str(),
      attempt.score,
      attempt.total
    );

    record_attempt(
      services.history.as_ref(),
      &self.entries,
      attempt,
      services.history_cap,
    )
    .log_warn("Failed to record quiz attempt");
  }

  // ==================== Matching commands ====================

  pub fn select_match_pair(&mut self, word: &str, definition: &str) -> Result<(), CommandError> {
    self.matching_board("select_match_pair")?.select(word, definition)
  }

  pub fn remove_match(&mut self, word: &str) -> Result<(), CommandError> {
    self.matching_board("remove_match")?.remove(word)
  }

  /// Score every pair at once. Requires a pair for every word.
  pub fn check_matches(&mut self, services: &QuizServices) -> Result<Vec<bool>, CommandError> {
    let (board, results) = self.matching_parts("check_matches")?;
    let unmatched = board.unmatched();
    if unmatched > 0 {
      return Err(CommandError::IncompleteMatches { unmatched });
    }

    let correct = board.check(results);
    for (pair, is_correct) in board.pairs.iter().zip(&correct) {
      if let Some(result) = results.get_mut(&WordKey::new(&pair.word)) {
        result.definition_correct = Check::from_bool(*is_correct);
      }
    }

    let score = correct.iter().filter(|c| **c).count() as u32;
    let attempt = Attempt::new(score, self.items.len() as u32);
    self.finish(attempt, services);
    Ok(correct)
  }

  // ==================== Follow-ups ====================

  /// Build a practice session from the words missed in this one.
  ///
  /// Matching sessions are practiced as definition-only questions.
  pub fn practice_missed(&mut self) -> Result<QuizSession, CommandError> {
    if self.phase != SessionPhase::Results {
      return Err(CommandError::WrongPhase { command: "practice_missed" });
    }

    let missed: HashSet<WordKey> = self
      .results
      .iter()
      .filter(|(_, result)| result.is_missed())
      .map(|(key, _)| key.clone())
      .collect();
    if missed.is_empty() {
      return Err(CommandError::NoMissedWords);
    }

    let mode = match self.mode {
      QuizMode::Matching => QuizMode::DefinitionOnly,
      other => other,
    };
    let mut rng = StdRng::from_rng(&mut self.rng);

    let mut items: Vec<QuizItem> = self
      .items
      .iter()
      .filter(|item| missed.contains(&item.key()))
      .cloned()
      .collect();
    items.shuffle(&mut rng);

    let entries = self
      .entries
      .iter()
      .filter(|entry| missed.contains(&entry.key()))
      .cloned()
      .collect();
    let results = items
      .iter()
      .map(|item| (item.key(), WordResult::new(item, mode)))
      .collect();

    tracing::info!("Practicing {} missed word(s)", items.len());

    Ok(QuizSession {
      mode,
      kind: SessionKind::Practice,
      phase: SessionPhase::Quiz,
      entries,
      queue: (0..items.len()).collect(),
      items,
      index: 0,
      asked: 0,
      results,
      answer_phase: AnswerPhase::Answering,
      answer: String::new(),
      spelling: String::new(),
      feedback: None,
      board: None,
      history: Vec::new(),
      rng,
    })
  }

  /// Ask for an extra explanation of the current word. Never mutates the session.
  pub async fn enhance(
    &self,
    kind: EnhancementKind,
    services: &QuizServices,
  ) -> Result<Enhancement, CommandError> {
    let item = self.current_item().ok_or(CommandError::NoCurrentItem)?;
    let content = services
      .enhancer
      .enhance(&item.word, &item.definition, kind)
      .await
      .map_err(|e| {
        tracing::warn!("Enhancement for '{}' failed: {}", item.word, e);
        CommandError::EnhancementFailed(e)
      })?;
    Ok(Enhancement {
      word: item.word.clone(),
      kind,
      content,
    })
  }
}

async fn resolve_definitions(entries: &[WordEntry], services: &QuizServices) -> HashMap<WordKey, String> {
  let bare: Vec<String> = entries
    .iter()
    .filter(|entry| entry.custom_definition().is_none())
    .map(|entry| entry.word().to_string())
    .collect();
  if bare.is_empty() {
    return HashMap::new();
  }
  services
    .definitions
    .lookup_or_generate(&bare)
    .await
    .log_warn_default("Definition lookup failed, using placeholders")
}

/// Request distractors for every item at once; any failure aborts the start
async fn attach_options(
  items: &mut [QuizItem],
  services: &QuizServices,
  rng: &mut StdRng,
) -> Result<(), StartError> {
  let requests = items
    .iter()
    .map(|item| services.distractors.generate(&item.word, &item.definition));
  let generated = try_join_all(requests).await.map_err(|e| {
    tracing::warn!("Distractor generation failed: {}", e);
    StartError::OptionsUnavailable(e)
  })?;

  for (item, distractors) in items.iter_mut().zip(generated) {
    let options = build_options(&item.definition, distractors, config::DISTRACTOR_COUNT, rng)
      .map_err(|reason| StartError::InvalidOptions {
        word: item.word.clone(),
        reason,
      })?;
    item.options = Some(options);
  }
  Ok(())
}
