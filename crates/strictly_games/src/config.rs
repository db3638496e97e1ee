//! Service configuration.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Environment variable overriding [`ServiceConfig::database_path`].
pub const DB_ENV: &str = "STRICTLY_GAMES_DB";
/// Environment variable overriding [`ServiceConfig::log_filter`].
pub const LOG_ENV: &str = "STRICTLY_GAMES_LOG";

/// Settings for the game service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// Times an action is retried after losing a write race.
    #[serde(default = "default_max_conflict_retries")]
    max_conflict_retries: u32,

    /// Changes buffered per notification subscriber.
    #[serde(default = "default_notification_capacity")]
    notification_capacity: usize,
}

#[instrument]
fn default_database_path() -> String {
    "strictly_games.db".to_string()
}

#[instrument]
fn default_log_filter() -> String {
    "info".to_string()
}

#[instrument]
fn default_max_conflict_retries() -> u32 {
    3
}

#[instrument]
fn default_notification_capacity() -> usize {
    64
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_filter: default_log_filter(),
            max_conflict_retries: default_max_conflict_retries(),
            notification_capacity: default_notification_capacity(),
        }
    }
}

impl ServiceConfig {
    /// Parses configuration from TOML text. Missing keys take defaults.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(database_path = %config.database_path, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the optional file, then applies `.env` and process environment
    /// overrides.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies overrides looked up by environment variable name.
    #[instrument(skip(self, lookup))]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(DB_ENV) {
            debug!(path = %path, "Database path overridden");
            self.database_path = path;
        }
        if let Some(filter) = lookup(LOG_ENV) {
            debug!(filter = %filter, "Log filter overridden");
            self.log_filter = filter;
        }
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
