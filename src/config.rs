//! Application configuration constants.
//!
//! Tunables live here as constants; deployment settings (database path,
//! bind address, AI credentials) are resolved by [`AppConfig::load`].

use serde::Deserialize;
use std::path::PathBuf;

// ==================== File / Environment Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    database: Option<DatabaseSection>,
    server: Option<ServerSection>,
    ai: Option<AiSection>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct AiSection {
    api_key: Option<String>,
    model: Option<String>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl AppConfig {
    /// Load settings with priority: config.toml > environment (.env) > default
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = match std::fs::read_to_string("config.toml") {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!("Ignoring malformed config.toml: {}", e);
                    ConfigFile::default()
                }
            },
            Err(_) => ConfigFile::default(),
        };

        Self::resolve(file, |name| std::env::var(name).ok())
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let database_path = match file.database.and_then(|db| db.path) {
            Some(path) => {
                tracing::info!("Using database from config.toml: {}", path);
                PathBuf::from(path)
            }
            None => match env("DATABASE_PATH") {
                Some(path) => {
                    tracing::info!("Using database from DATABASE_PATH env: {}", path);
                    PathBuf::from(path)
                }
                None => PathBuf::from(DEFAULT_DATABASE_PATH),
            },
        };

        let (file_addr, file_port) = file
            .server
            .map(|s| (s.addr, s.port))
            .unwrap_or((None, None));
        let addr = file_addr
            .or_else(|| env("SERVER_ADDR"))
            .unwrap_or_else(|| SERVER_ADDR.to_string());
        let port = file_port
            .or_else(|| env("SERVER_PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);

        let (file_key, file_model) = file
            .ai
            .map(|ai| (ai.api_key, ai.model))
            .unwrap_or((None, None));
        let gemini_api_key = file_key
            .or_else(|| API_KEY_VARS.iter().find_map(|name| env(*name)))
            .filter(|key| !key.trim().is_empty());
        let gemini_model = file_model
            .or_else(|| env("GEMINI_MODEL"))
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Self {
            database_path,
            bind_addr: format!("{}:{}", addr, port),
            gemini_api_key,
            gemini_model,
        }
    }
}

/// Default database location
pub const DEFAULT_DATABASE_PATH: &str = "data/vocab.db";

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Session Configuration ====================

/// Session expiration time in hours
pub const SESSION_EXPIRY_HOURS: i64 = 2;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

// ==================== AI Configuration ====================

/// Environment variables checked (in order) for the Google AI key
pub const API_KEY_VARS: [&str; 3] = ["GOOGLE_API_KEY", "GOOGLEAI_API_KEY", "GEMINI_API_KEY"];

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Learner profile sent with enhancement requests
pub const LEARNER_DETAILS: &str = "A student preparing for a vocabulary test.";

// ==================== Quiz Configuration ====================

/// Number of distractor choices in multiple choice mode
pub const DISTRACTOR_COUNT: usize = 3;

/// Maximum number of past word sets kept in history
pub const HISTORY_CAP: usize = 5;

/// Shown in place of a definition the provider could not supply
pub const MISSING_DEFINITION: &str = "Could not find a definition for this word.";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = AppConfig::resolve(ConfigFile::default(), env_from(&[]));
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_config_file_beats_env() {
        let file: ConfigFile = toml::from_str(
            r#"
            [database]
            path = "from-file.db"

            [ai]
            model = "file-model"
            "#,
        )
        .unwrap();
        let env = env_from(&[("DATABASE_PATH", "from-env.db"), ("GEMINI_MODEL", "env-model")]);
        let config = AppConfig::resolve(file, env);
        assert_eq!(config.database_path, PathBuf::from("from-file.db"));
        assert_eq!(config.gemini_model, "file-model");
    }

    #[test]
    fn test_api_key_env_fallback_order() {
        let env = env_from(&[("GEMINI_API_KEY", "third"), ("GOOGLEAI_API_KEY", "second")]);
        let config = AppConfig::resolve(ConfigFile::default(), env);
        assert_eq!(config.gemini_api_key.as_deref(), Some("second"));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let env = env_from(&[("GOOGLE_API_KEY", "  ")]);
        let config = AppConfig::resolve(ConfigFile::default(), env);
        assert_eq!(config.gemini_api_key, None);
    }

    #[test]
    fn test_port_from_env() {
        let env = env_from(&[("SERVER_PORT", "8080")]);
        let config = AppConfig::resolve(ConfigFile::default(), env);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }
}
