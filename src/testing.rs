//! Test doubles for the AI collaborators.
//!
//! `FakeAi` answers every collaborator trait deterministically, with
//! switches to make each one fail, so engine tests can walk both the happy
//! and the degraded paths.

use futures::future::{BoxFuture, FutureExt};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::ai::{
    AiError, AnswerEvaluator, DefinitionProvider, DistractorGenerator, EnhancementKind, Evaluation,
    ExplanationEnhancer,
};
use crate::db::StoreError;
use crate::domain::{Attempt, PastQuiz, WordEntry, WordKey, WordSetKey};
use crate::engine::QuizServices;
use crate::history::{HistoryStore, MemoryHistoryStore};

/// The definition `FakeAi` gives for `word`
pub fn meaning_of(word: &str) -> String {
    format!("meaning of {}", WordKey::new(word))
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[derive(Default)]
pub struct FakeAi {
    pub fail_definitions: AtomicBool,
    pub fail_evaluation: AtomicBool,
    pub fail_distractors: AtomicBool,
    pub fail_enhance: AtomicBool,
    pub definition_calls: AtomicUsize,
    pub evaluator_calls: AtomicUsize,
    /// Every word passed to the definition provider
    pub requested_words: Mutex<Vec<String>>,
    /// Words the provider has no definition for
    unknown: Vec<WordKey>,
}

impl FakeAi {
    pub fn with_unknown(mut self, word: &str) -> Self {
        self.unknown.push(WordKey::new(word));
        self
    }
}

impl DefinitionProvider for FakeAi {
    fn lookup_or_generate<'a>(
        &'a self,
        words: &'a [String],
    ) -> BoxFuture<'a, Result<HashMap<WordKey, String>, AiError>> {
        async move {
            self.definition_calls.fetch_add(1, Ordering::SeqCst);
            self.requested_words.lock().unwrap().extend(words.iter().cloned());
            if self.fail_definitions.load(Ordering::SeqCst) {
                return Err(AiError::Status(503, "unavailable".into()));
            }
            Ok(words
                .iter()
                .map(|w| WordKey::new(w))
                .filter(|key| !self.unknown.contains(key))
                .map(|key| {
                    let definition = meaning_of(key.as_str());
                    (key, definition)
                })
                .collect())
        }
        .boxed()
    }
}

impl AnswerEvaluator for FakeAi {
    /// Correct when the answer matches the definition ignoring case
    fn evaluate<'a>(
        &'a self,
        _word: &'a str,
        correct_definition: &'a str,
        user_answer: &'a str,
    ) -> BoxFuture<'a, Result<Evaluation, AiError>> {
        async move {
            self.evaluator_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_evaluation.load(Ordering::SeqCst) {
                return Err(AiError::EmptyResponse);
            }
            let is_correct = user_answer.trim().eq_ignore_ascii_case(correct_definition.trim());
            Ok(Evaluation {
                is_correct,
                feedback: if is_correct { "Correct!".into() } else { "Not quite.".into() },
            })
        }
        .boxed()
    }
}

impl DistractorGenerator for FakeAi {
    fn generate<'a>(
        &'a self,
        word: &'a str,
        _correct_definition: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, AiError>> {
        async move {
            if self.fail_distractors.load(Ordering::SeqCst) {
                return Err(AiError::InvalidOutput("no options".into()));
            }
            Ok((1..=3).map(|i| format!("wrong {} for {}", i, word)).collect())
        }
        .boxed()
    }
}

impl ExplanationEnhancer for FakeAi {
    fn enhance<'a>(
        &'a self,
        word: &'a str,
        _definition: &'a str,
        kind: EnhancementKind,
    ) -> BoxFuture<'a, Result<String, AiError>> {
        async move {
            if self.fail_enhance.load(Ordering::SeqCst) {
                return Err(AiError::Status(500, "boom".into()));
            }
            Ok(format!("{} for {}", kind.as_str(), word))
        }
        .boxed()
    }
}

/// History store whose every operation fails, as when the database is locked out
#[derive(Default)]
pub struct UnavailableHistory {
    pub calls: AtomicUsize,
}

impl UnavailableHistory {
    fn fail<T>(&self) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable)
    }
}

impl HistoryStore for UnavailableHistory {
    fn get(&self, _key: &WordSetKey) -> Result<Option<PastQuiz>, StoreError> {
        self.fail()
    }

    fn put(&self, _key: &WordSetKey, _quiz: &PastQuiz) -> Result<(), StoreError> {
        self.fail()
    }

    fn append_attempt(
        &self,
        _key: &WordSetKey,
        _entries: &[WordEntry],
        _attempt: Attempt,
    ) -> Result<PastQuiz, StoreError> {
        self.fail()
    }

    fn remove(&self, _key: &WordSetKey) -> Result<(), StoreError> {
        self.fail()
    }

    fn list(&self) -> Result<Vec<PastQuiz>, StoreError> {
        self.fail()
    }
}

/// `QuizServices` wired to one `FakeAi` and an in-memory history
pub struct TestServices {
    pub ai: Arc<FakeAi>,
    pub history: Arc<MemoryHistoryStore>,
    pub services: QuizServices,
}

impl TestServices {
    pub fn new(ai: FakeAi) -> Self {
        let ai = Arc::new(ai);
        let history = Arc::new(MemoryHistoryStore::new());
        let services = QuizServices {
            definitions: ai.clone(),
            evaluator: ai.clone(),
            distractors: ai.clone(),
            enhancer: ai.clone(),
            history: history.clone(),
            history_cap: crate::config::HISTORY_CAP,
        };
        Self { ai, history, services }
    }
}
