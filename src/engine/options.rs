//! Multiple-choice option sets

use rand::Rng;
use rand::seq::SliceRandom;

/// Combine the correct definition with `needed` distractors and shuffle.
///
/// Blank distractors, duplicates, and copies of the correct definition are
/// dropped (case-insensitively). Fails when fewer than `needed` remain.
pub fn build_options<R: Rng + ?Sized>(
  correct: &str,
  distractors: Vec<String>,
  needed: usize,
  rng: &mut R,
) -> Result<Vec<String>, String> {
  let correct_folded = fold(correct);
  let mut seen = vec![correct_folded];
  let mut options = Vec::with_capacity(needed + 1);

  for distractor in distractors {
    let trimmed = distractor.trim();
    if trimmed.is_empty() {
      continue;
    }
    let folded = fold(trimmed);
    if seen.contains(&folded) {
      continue;
    }
    seen.push(folded);
    options.push(trimmed.to_string());
    if options.len() == needed {
      break;
    }
  }

  if options.len() < needed {
    return Err(format!(
      "expected {} distinct distractors, got {}",
      needed,
      options.len()
    ));
  }

  options.push(correct.to_string());
  options.shuffle(rng);
  Ok(options)
}

fn fold(s: &str) -> String {
  s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn test_correct_definition_appears_exactly_once() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
      let options =
        build_options("brief", strings(&["long", "slow", "Brief", "loud"]), 3, &mut rng).unwrap();
      assert_eq!(options.len(), 4);
      assert_eq!(options.iter().filter(|o| o.as_str() == "brief").count(), 1);

      let mut distinct = options.clone();
      distinct.sort();
      distinct.dedup();
      assert_eq!(distinct.len(), 4);
    }
  }

  #[test]
  fn test_too_few_distinct_distractors() {
    let mut rng = StdRng::seed_from_u64(1);
    let err = build_options("brief", strings(&["long", "LONG ", " "]), 3, &mut rng);
    assert!(err.is_err());
  }
}
