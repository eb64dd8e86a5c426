//! Application state shared by all handlers.

use std::sync::Arc;

use crate::ai::{CachedDefinitions, GeminiClient};
use crate::config::{self, AppConfig};
use crate::db::{DbPool, SqliteDefinitionStore};
use crate::engine::QuizServices;
use crate::history::SqliteHistoryStore;
use crate::session::SessionStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database (history, definition cache)
    pub db: DbPool,

    /// Collaborators handed to every quiz session
    pub services: QuizServices,

    pub sessions: SessionStore,

    /// Whether an AI API key was configured at startup
    pub ai_configured: bool,
}

impl AppState {
    /// Production wiring: Gemini behind the SQLite definition cache, SQLite history
    pub fn new(db: DbPool, config: &AppConfig) -> Self {
        let gemini = Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        ));
        if gemini.is_configured() {
            tracing::info!("AI collaborators use Gemini model {}", gemini.model());
        }
        let definitions = CachedDefinitions::new(
            Arc::new(SqliteDefinitionStore::new(db.clone())),
            gemini.clone(),
        );

        let services = QuizServices {
            definitions: Arc::new(definitions),
            evaluator: gemini.clone(),
            distractors: gemini.clone(),
            enhancer: gemini.clone(),
            history: Arc::new(SqliteHistoryStore::new(db.clone())),
            history_cap: config::HISTORY_CAP,
        };

        Self::with_services(db, services, gemini.is_configured())
    }

    pub fn with_services(db: DbPool, services: QuizServices, ai_configured: bool) -> Self {
        Self {
            db,
            services,
            sessions: SessionStore::new(),
            ai_configured,
        }
    }
}
