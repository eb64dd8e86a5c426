//! Word list input parsing.
//!
//! Supports:
//! - `a, b, c` - comma-separated entries
//! - `word (definition)` - user-supplied definition, skips the provider
//! - commas inside parentheses do not split an entry
//!
//! Anything that is not a well-formed `word (definition)` entry is kept as a
//! bare word or phrase.

use crate::domain::WordEntry;

/// Parse the raw word list into entries, in input order.
///
/// Blank entries are dropped; duplicates are kept (see [`dedup_entries`]).
pub fn parse_word_list(input: &str) -> Vec<WordEntry> {
  split_entries(input)
    .iter()
    .filter_map(|raw| parse_entry(raw))
    .collect()
}

/// Keep the first entry for each word (case-insensitive)
pub fn dedup_entries(entries: Vec<WordEntry>) -> Vec<WordEntry> {
  let mut seen = std::collections::HashSet::new();
  entries
    .into_iter()
    .filter(|entry| seen.insert(entry.key()))
    .collect()
}

/// Split on commas at parenthesis depth zero
fn split_entries(input: &str) -> Vec<String> {
  let mut entries = Vec::new();
  let mut current = String::new();
  let mut depth = 0usize;

  for ch in input.chars() {
    match ch {
      '(' => {
        depth += 1;
        current.push(ch);
      }
      ')' => {
        // A stray ')' must not push depth negative
        depth = depth.saturating_sub(1);
        current.push(ch);
      }
      ',' if depth == 0 => entries.push(std::mem::take(&mut current)),
      _ => current.push(ch),
    }
  }
  entries.push(current);
  entries
}

/// Parse one entry: `word (definition)` or a bare word/phrase
pub fn parse_entry(raw: &str) -> Option<WordEntry> {
  let entry = raw.split_whitespace().collect::<Vec<_>>().join(" ");
  if entry.is_empty() {
    return None;
  }

  match split_custom(&entry) {
    Some((word, definition)) => Some(WordEntry::custom(word, definition)),
    None => Some(WordEntry::bare(entry)),
  }
}

/// The first '(' opens the definition, and its matching ')' must end the entry
fn split_custom(entry: &str) -> Option<(&str, &str)> {
  let open = entry.find('(')?;
  let close = find_closing_paren(entry, open)?;
  if close != entry.len() - 1 {
    return None;
  }

  let word = entry[..open].trim();
  let definition = entry[open + 1..close].trim();
  if word.is_empty() || definition.is_empty() {
    return None;
  }
  Some((word, definition))
}

/// Byte index of the ')' closing the '(' at `start`, handling nesting
fn find_closing_paren(s: &str, start: usize) -> Option<usize> {
  let mut depth = 0;
  for (i, ch) in s.char_indices().skip_while(|(i, _)| *i < start) {
    if ch == '(' {
      depth += 1;
    } else if ch == ')' {
      depth -= 1;
      if depth == 0 {
        return Some(i);
      }
    }
  }
  None
}
