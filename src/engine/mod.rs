//! Quiz session state machine.
//!
//! A [`QuizSession`] owns one quiz from word-list submission to results.
//! Every command either transitions the session or returns a
//! [`CommandError`] with the session untouched. All I/O goes through the
//! collaborators bundled in [`QuizServices`].

pub mod error;
pub mod matching;
pub mod options;
pub mod session;
pub mod snapshot;

use std::sync::Arc;

use crate::ai::{AnswerEvaluator, DefinitionProvider, DistractorGenerator, ExplanationEnhancer};
use crate::history::HistoryStore;

pub use error::{CommandError, StartError};
pub use session::{AnswerPhase, Enhancement, QuizSession, SessionKind, SessionPhase};
pub use snapshot::QuizSnapshot;

/// Collaborators a session talks to
#[derive(Clone)]
pub struct QuizServices {
  pub definitions: Arc<dyn DefinitionProvider>,
  pub evaluator: Arc<dyn AnswerEvaluator>,
  pub distractors: Arc<dyn DistractorGenerator>,
  pub enhancer: Arc<dyn ExplanationEnhancer>,
  pub history: Arc<dyn HistoryStore>,
  /// Most word sets kept in history
  pub history_cap: usize,
}
