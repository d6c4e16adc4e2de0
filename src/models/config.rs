//! Application configuration structures.

use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ConfigError, Result};

/// Hard cap the recent changes API applies to `rclimit` for anonymous clients.
pub const MAX_API_LIMIT: u32 = 500;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Change feed request settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Analytical store and staging settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log level and log file
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration if the file exists.
    ///
    /// Returns `Ok(None)` only when there is no file at `path`; a file that
    /// cannot be read or parsed is an error.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        match Self::load(path) {
            Ok(config) => Ok(Some(config)),
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Validate configuration values before any request is made.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.api.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

/// Parameters shared by every window request of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// MediaWiki `api.php` endpoint
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// `rclimit`; a window returning exactly this many rows is treated as truncated
    #[serde(default = "defaults::limit")]
    pub limit: u32,

    /// Tumbling window width in seconds
    #[serde(default = "defaults::window_size")]
    pub window_size_secs: i64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum window requests in flight
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            limit: defaults::limit(),
            window_size_secs: defaults::window_size(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.window_size_secs <= 0 {
            return Err(ConfigError::InvalidWindowSize(self.window_size_secs));
        }
        if self.limit == 0 || self.limit > MAX_API_LIMIT {
            return Err(ConfigError::InvalidLimit(self.limit));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue("api.user_agent is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "api.timeout_secs must be > 0".into(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue(
                "api.max_concurrent must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Where the finished table goes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// DuckDB database file
    #[serde(default = "defaults::database_path")]
    pub database_path: String,

    /// Schema created if absent
    #[serde(default = "defaults::schema")]
    pub schema: String,

    /// Table replaced on every run
    #[serde(default = "defaults::table")]
    pub table: String,

    /// Directory for the pre-publish snapshot; disabled when unset
    #[serde(default)]
    pub staging_dir: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: defaults::database_path(),
            schema: defaults::schema(),
            table: defaults::table(),
            staging_dir: None,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "storage.database_path is empty".into(),
            ));
        }
        // Schema and table names are spliced into DDL.
        let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        for name in [&self.schema, &self.table] {
            if !identifier.is_match(name) {
                return Err(ConfigError::InvalidIdentifier(name.clone()));
            }
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Log file, truncated at start; console only when unset
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file: None,
        }
    }
}

mod defaults {
    // Api defaults
    pub fn base_url() -> String {
        "https://en.wikipedia.org/w/api.php".into()
    }
    pub fn limit() -> u32 {
        super::MAX_API_LIMIT
    }
    pub fn window_size() -> i64 {
        30
    }
    pub fn user_agent() -> String {
        "wiki-edits/0.1 (daily recent changes extract)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Storage defaults
    pub fn database_path() -> String {
        "data/wikipedia.db".into()
    }
    pub fn schema() -> String {
        "iv".into()
    }
    pub fn table() -> String {
        "wiki_edits".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
