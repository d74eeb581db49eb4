//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub course_model: String,
    pub flashcard_model: String,
    pub explore_model: String,
    pub tutor_model: String,
    pub test_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Storage Settings ---
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://coursepilot.db?mode=rwc".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let course_model =
            std::env::var("COURSE_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let flashcard_model =
            std::env::var("FLASHCARD_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let explore_model =
            std::env::var("EXPLORE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let tutor_model = std::env::var("TUTOR_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let test_model = std::env::var("TEST_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        Ok(Self {
            database_url,
            log_level,
            openai_api_key,
            course_model,
            flashcard_model,
            explore_model,
            tutor_model,
            test_model,
        })
    }
}
