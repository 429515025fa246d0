//! Error types for merge-gate

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a merge command
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value (detected before any remote call)
    #[error("invalid configuration: {field} = {value} (expected {expected})")]
    Config {
        /// Configuration key
        field: &'static str,
        /// Offending value as supplied
        value: String,
        /// Human-readable valid range
        expected: String,
    },

    /// No usable authentication token
    #[error("authentication error: {0}")]
    Auth(String),

    /// Trigger event payload missing or malformed
    #[error("invalid trigger event: {0}")]
    Event(String),

    /// GitHub API returned an unexpected response
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Error from the octocrab client
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// Raw HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("failed to parse config file: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Build a configuration error for an out-of-range value
    pub fn config(field: &'static str, value: impl ToString, expected: impl Into<String>) -> Self {
        Self::Config {
            field,
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Whether this error belongs to the "fix your setup" category
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::TomlParse(_) | Self::Auth(_))
    }
}
