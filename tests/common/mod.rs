//! Shared setup for the HTTP API tests.

use axum::Router;
use axum_test::TestServer;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use vocab_quiz::ai::{
    AiError, AnswerEvaluator, DefinitionProvider, DistractorGenerator, EnhancementKind, Evaluation,
    ExplanationEnhancer,
};
use vocab_quiz::config::HISTORY_CAP;
use vocab_quiz::db::{init_memory_db, DbPool};
use vocab_quiz::domain::WordKey;
use vocab_quiz::engine::QuizServices;
use vocab_quiz::handlers;
use vocab_quiz::history::SqliteHistoryStore;
use vocab_quiz::state::AppState;

pub fn meaning_of(word: &str) -> String {
    format!("meaning of {}", WordKey::new(word))
}

/// Deterministic AI: definitions are `meaning of <word>`, answers are
/// correct when they equal the definition.
#[derive(Default)]
pub struct ScriptedAi {
    pub fail_evaluation: AtomicBool,
    pub fail_distractors: AtomicBool,
}

impl DefinitionProvider for ScriptedAi {
    fn lookup_or_generate<'a>(
        &'a self,
        words: &'a [String],
    ) -> BoxFuture<'a, Result<HashMap<WordKey, String>, AiError>> {
        async move { Ok(words.iter().map(|w| (WordKey::new(w), meaning_of(w))).collect()) }.boxed()
    }
}

impl AnswerEvaluator for ScriptedAi {
    fn evaluate<'a>(
        &'a self,
        _word: &'a str,
        correct_definition: &'a str,
        user_answer: &'a str,
    ) -> BoxFuture<'a, Result<Evaluation, AiError>> {
        async move {
            if self.fail_evaluation.load(Ordering::SeqCst) {
                return Err(AiError::EmptyResponse);
            }
            let is_correct = user_answer.trim() == correct_definition;
            Ok(Evaluation {
                is_correct,
                feedback: if is_correct { "Correct!".into() } else { "Not quite.".into() },
            })
        }
        .boxed()
    }
}

impl DistractorGenerator for ScriptedAi {
    fn generate<'a>(
        &'a self,
        word: &'a str,
        _correct_definition: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, AiError>> {
        async move {
            if self.fail_distractors.load(Ordering::SeqCst) {
                return Err(AiError::Status(503, "overloaded".into()));
            }
            Ok((1..=3).map(|i| format!("wrong {} for {}", i, word)).collect())
        }
        .boxed()
    }
}

impl ExplanationEnhancer for ScriptedAi {
    fn enhance<'a>(
        &'a self,
        word: &'a str,
        _definition: &'a str,
        kind: EnhancementKind,
    ) -> BoxFuture<'a, Result<String, AiError>> {
        async move { Ok(format!("{} for {}", kind.as_str(), word)) }.boxed()
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub ai: Arc<ScriptedAi>,
    pub db: DbPool,
}

pub fn app_with(ai: ScriptedAi) -> TestApp {
    let ai = Arc::new(ai);
    let db = init_memory_db().unwrap();
    let services = QuizServices {
        definitions: ai.clone(),
        evaluator: ai.clone(),
        distractors: ai.clone(),
        enhancer: ai.clone(),
        history: Arc::new(SqliteHistoryStore::new(db.clone())),
        history_cap: HISTORY_CAP,
    };
    let router: Router = handlers::router(AppState::with_services(db.clone(), services, true));
    let server = TestServer::builder().save_cookies().build(router).unwrap();
    TestApp { server, ai, db }
}

pub fn app() -> TestApp {
    app_with(ScriptedAi::default())
}
