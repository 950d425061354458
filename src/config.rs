//! Application configuration.
//!
//! All configuration comes from environment variables, with sensible
//! defaults for local development. A missing `OPENAI_API_KEY` is not an
//! error: it disables AI generation and forces the deterministic fallback.

use std::path::PathBuf;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Secret signing key for the HTTP layer.
    pub secret_key: String,
    /// Location of the SQLite database file.
    pub database_path: PathBuf,
    /// API key for the text-generation backend. `None` disables AI generation.
    pub openai_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `HOST` / `PORT` - bind address (defaults `0.0.0.0:5001`)
    /// - `SECRET_KEY` - signing key
    /// - `DATABASE_PATH` - SQLite file location (default `./data/quests.db`)
    /// - `OPENAI_API_KEY` - optional text-generation credential
    pub fn from_env() -> Self {
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        if openai_api_key.is_none() {
            tracing::warn!("OpenAI API key not found. AI features will use fallback generation.");
        }

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),
            secret_key: std::env::var("SECRET_KEY")
                .unwrap_or_else(|_| "questmaster-secret-key-2024".to_string()),
            database_path: std::env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/quests.db")),
            openai_api_key,
        }
    }
}
