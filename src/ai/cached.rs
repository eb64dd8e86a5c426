use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::Arc;

use super::{AiError, DefinitionProvider};
use crate::db::{LogOnError, StoreError};
use crate::domain::WordKey;

/// Persistent word -> definition cache
pub trait DefinitionStore: Send + Sync {
  /// Cached definitions for whichever of `words` are present
  fn get_many(&self, words: &[String]) -> Result<HashMap<WordKey, String>, StoreError>;
  fn put_many(&self, definitions: &[(WordKey, String)]) -> Result<(), StoreError>;
}

/// Look-aside cache in front of a generating provider.
///
/// Store failures degrade to a cache miss. A generator failure is only
/// surfaced when the cache had nothing to offer.
pub struct CachedDefinitions {
  store: Arc<dyn DefinitionStore>,
  generator: Arc<dyn DefinitionProvider>,
}

impl CachedDefinitions {
  pub fn new(store: Arc<dyn DefinitionStore>, generator: Arc<dyn DefinitionProvider>) -> Self {
    Self { store, generator }
  }
}

impl DefinitionProvider for CachedDefinitions {
  fn lookup_or_generate<'a>(
    &'a self,
    words: &'a [String],
  ) -> BoxFuture<'a, Result<HashMap<WordKey, String>, AiError>> {
    async move {
      let mut found = self
        .store
        .get_many(words)
        .log_warn_default("Failed to read definition cache");

      let missing: Vec<String> = words
        .iter()
        .filter(|w| !found.contains_key(&WordKey::new(w)))
        .cloned()
        .collect();
      if missing.is_empty() {
        return Ok(found);
      }

      tracing::debug!(
        "Definition cache: {} hit(s), {} miss(es)",
        words.len() - missing.len(),
        missing.len()
      );

      match self.generator.lookup_or_generate(&missing).await {
        Ok(generated) => {
          let fresh: Vec<(WordKey, String)> = generated
            .into_iter()
            .filter(|(key, _)| missing.iter().any(|w| WordKey::new(w) == *key))
            .collect();
          self
            .store
            .put_many(&fresh)
            .log_warn("Failed to persist generated definitions");
          found.extend(fresh);
          Ok(found)
        }
        Err(e) if found.is_empty() => Err(e),
        Err(e) => {
          tracing::warn!("Definition generation failed, using cached subset: {}", e);
          Ok(found)
        }
      }
    }
    .boxed()
  }
}
