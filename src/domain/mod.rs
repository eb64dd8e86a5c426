pub mod history;
pub mod quiz;

pub use history::{Attempt, PastQuiz, WordSetKey};
pub use quiz::{Check, MatchedPair, QuizItem, QuizMode, WordEntry, WordKey, WordResult};
