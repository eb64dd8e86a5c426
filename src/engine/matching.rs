use indexmap::IndexMap;
use rand::Rng;
use rand::seq::SliceRandom;

use super::error::CommandError;
use crate::domain::{MatchedPair, QuizItem, WordKey, WordResult};

/// Word and definition columns for matching mode
#[derive(Debug, Clone)]
pub struct MatchBoard {
  /// Working-list order
  pub words: Vec<String>,
  /// Shuffled independently of `words`
  pub definitions: Vec<String>,
  /// In the order they were declared
  pub pairs: Vec<MatchedPair>,
  /// Correctness per pair, set once checked
  pub checked: Option<Vec<bool>>,
}

impl MatchBoard {
  pub fn new<R: Rng + ?Sized>(items: &[QuizItem], rng: &mut R) -> Self {
    let words = items.iter().map(|i| i.word.clone()).collect();
    let mut definitions: Vec<String> = items.iter().map(|i| i.definition.clone()).collect();
    definitions.shuffle(rng);
    Self {
      words,
      definitions,
      pairs: Vec::new(),
      checked: None,
    }
  }

  fn find_word(&self, word: &str) -> Option<&str> {
    let key = WordKey::new(word);
    self.words.iter().find(|w| WordKey::new(w) == key).map(String::as_str)
  }

  fn pair_index(&self, word: &str) -> Option<usize> {
    self.pairs.iter().position(|p| p.word == word)
  }

  /// Pair `word` with `definition`, replacing any pair the word already had
  pub fn select(&mut self, word: &str, definition: &str) -> Result<(), CommandError> {
    let word = self
      .find_word(word)
      .ok_or_else(|| CommandError::UnknownWord(word.to_string()))?
      .to_string();
    let existing = self.pair_index(&word);

    // Duplicate definitions are separate cards; one copy per pair
    let copies = self.definitions.iter().filter(|d| *d == definition).count();
    let used = self
      .pairs
      .iter()
      .enumerate()
      .filter(|(i, p)| Some(*i) != existing && p.definition == definition)
      .count();
    if used >= copies {
      return Err(CommandError::UnknownDefinition);
    }

    let pair = MatchedPair {
      word,
      definition: definition.to_string(),
    };
    match existing {
      Some(i) => self.pairs[i] = pair,
      None => self.pairs.push(pair),
    }
    Ok(())
  }

  pub fn remove(&mut self, word: &str) -> Result<(), CommandError> {
    let canonical = self
      .find_word(word)
      .ok_or_else(|| CommandError::UnknownWord(word.to_string()))?
      .to_string();
    let index = self
      .pair_index(&canonical)
      .ok_or(CommandError::NoMatchForWord(canonical))?;
    self.pairs.remove(index);
    Ok(())
  }

  pub fn unmatched(&self) -> usize {
    self.words.len() - self.pairs.len()
  }

  /// Compare every pair with the true definition, aligned with `pairs`
  pub fn check(&mut self, results: &IndexMap<WordKey, WordResult>) -> Vec<bool> {
    let correct: Vec<bool> = self
      .pairs
      .iter()
      .map(|pair| {
        results
          .get(&WordKey::new(&pair.word))
          .is_some_and(|r| r.definition == pair.definition)
      })
      .collect();
    self.checked = Some(correct.clone());
    correct
  }
}
