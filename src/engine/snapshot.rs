//! Serializable view of a session, returned after every command.

use serde::Serialize;

use super::session::{AnswerPhase, QuizSession, SessionKind, SessionPhase};
use crate::domain::{Attempt, Check, MatchedPair, QuizMode, WordResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSnapshot {
  pub mode: QuizMode,
  pub phase: SessionPhase,
  pub practice: bool,
  /// Only while a question is open
  pub answer_phase: Option<AnswerPhase>,
  /// 1-based number of the current question
  pub position: usize,
  pub total_words: usize,
  /// Words left in the practice pool
  pub remaining: usize,
  pub current: Option<QuestionView>,
  pub answer: String,
  pub spelling: String,
  pub feedback: Option<String>,
  pub score: u32,
  pub max_score: u32,
  /// Per-word outcomes, filled in once the session is over
  pub results: Vec<WordResult>,
  pub history: Vec<Attempt>,
  pub matching: Option<MatchingView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
  pub word: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<String>>,
  /// Revealed once the answer has been submitted
  pub definition: Option<String>,
  pub definition_correct: Check,
  pub spelling_correct: Check,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchingView {
  pub words: Vec<String>,
  pub definitions: Vec<String>,
  pub pairs: Vec<MatchedPair>,
  /// Aligned with `pairs` after checking
  pub correct: Option<Vec<bool>>,
}

impl QuizSession {
  pub fn snapshot(&self) -> QuizSnapshot {
    let finished = matches!(self.phase, SessionPhase::Results | SessionPhase::PracticeComplete);
    let current = self.current_index().map(|index| {
      let item = &self.items[index];
      let result = self.results.get(&item.key());
      let revealed = !matches!(self.answer_phase, AnswerPhase::Answering | AnswerPhase::Evaluating);
      QuestionView {
        word: item.word.clone(),
        options: item.options.clone(),
        definition: revealed.then(|| item.definition.clone()),
        definition_correct: result.map_or(Check::Unknown, |r| r.definition_correct),
        spelling_correct: result.map_or(Check::NotApplicable, |r| r.spelling_correct),
      }
    });

    let position = match (self.kind, current.is_some()) {
      (SessionKind::Regular, true) => self.index + 1,
      (SessionKind::Practice, true) => self.asked + 1,
      (_, false) => 0,
    };

    QuizSnapshot {
      mode: self.mode,
      phase: self.phase,
      practice: self.kind == SessionKind::Practice,
      answer_phase: current.as_ref().map(|_| self.answer_phase),
      position,
      total_words: self.items.len(),
      remaining: self.queue.len(),
      current,
      answer: self.answer.clone(),
      spelling: self.spelling.clone(),
      feedback: self.feedback.clone(),
      score: self.score(),
      max_score: self.max_score(),
      results: if finished {
        self.results.values().cloned().collect()
      } else {
        Vec::new()
      },
      history: self.history.clone(),
      matching: self.board.as_ref().map(|board| MatchingView {
        words: board.words.clone(),
        definitions: board.definitions.clone(),
        pairs: board.pairs.clone(),
        correct: board.checked.clone(),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::domain::QuizMode;
  use crate::engine::{QuizSession, SessionPhase};
  use crate::testing::{meaning_of, seeded_rng, FakeAi, TestServices};

  #[tokio::test]
  async fn test_definition_hidden_until_answered() {
    let env = TestServices::new(FakeAi::default());
    let mut session = QuizSession::start("terse", QuizMode::DefinitionOnly, &env.services, seeded_rng(9))
      .await
      .unwrap();

    let snap = session.snapshot();
    let current = snap.current.unwrap();
    assert_eq!(current.word, "terse");
    assert!(current.definition.is_none());
    assert!(snap.results.is_empty());

    session.submit_answer(&meaning_of("terse"), &env.services).await.unwrap();
    let snap = session.snapshot();
    assert_eq!(snap.current.unwrap().definition, Some(meaning_of("terse")));
    assert_eq!(snap.feedback.as_deref(), Some("Correct!"));

    session.next_question(&env.services).unwrap();
    let snap = session.snapshot();
    assert_eq!(snap.phase, SessionPhase::Results);
    assert!(snap.current.is_none());
    assert_eq!(snap.results.len(), 1);
    assert_eq!((snap.score, snap.max_score), (1, 1));
  }

  #[tokio::test]
  async fn test_matching_snapshot_serializes_board() {
    let env = TestServices::new(FakeAi::default());
    let session = QuizSession::start("a1, b2", QuizMode::Matching, &env.services, seeded_rng(9))
      .await
      .unwrap();

    let json = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(json["phase"], "matching");
    assert_eq!(json["mode"], "matching");
    assert_eq!(json["matching"]["words"].as_array().unwrap().len(), 2);
    assert!(json["current"].is_null());
  }
}
