// src/error.rs

//! Unified error handling for the extraction pipeline.
//!
//! Every failure in this crate is fatal to a run: nothing is retried and
//! nothing is written to the store unless every window succeeded.

use thiserror::Error;

use crate::models::WindowSpec;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration or command-line input
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A window could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The accumulated table could not be written to the store
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A staged table was requested but is not there
    #[error("No staged table at {0}")]
    StagingMissing(String),
}

impl AppError {
    /// Create a configuration error for an out-of-range value.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(ConfigError::InvalidValue(message.into()))
    }
}

/// Local configuration problems, surfaced before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("window size must be a positive number of seconds, got {0}")]
    InvalidWindowSize(i64),

    #[error("per-request limit must be between 1 and 500, got {0}")]
    InvalidLimit(u32),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("'{0}' is not a plain SQL identifier")]
    InvalidIdentifier(String),

    #[error("{0}")]
    InvalidValue(String),
}

/// Failure while fetching a single window from the change feed.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The API answered with a non-success status
    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// The window returned exactly the per-request cap, so data was likely cut off
    #[error(
        "window {window} returned {limit} records (the per-request cap); use a smaller window size"
    )]
    WindowSaturated { window: WindowSpec, limit: u32 },

    /// The body was not the expected JSON envelope
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No HTTP response at all (connect failure, timeout, broken body)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failure while writing the finished table to the analytical store.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("cannot open store at {location}: {source}")]
    ConnectionFailed {
        location: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("write failed: {0}")]
    WriteFailed(#[from] duckdb::Error),

    #[error("cannot prepare store location: {0}")]
    Location(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_into_app_error() {
        let err: AppError = ConfigError::InvalidWindowSize(0).into();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidWindowSize(0))
        ));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn request_failed_message_carries_status_and_body() {
        let err = FetchError::RequestFailed {
            status: 503,
            body: "upstream unavailable".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("upstream unavailable"));
    }
}
