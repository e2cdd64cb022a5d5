//! Error types for botcheck operations

use std::path::PathBuf;
use std::time::Duration;

/// Result type for botcheck operations
pub type Result<T> = std::result::Result<T, BotcheckError>;

/// Error types for the validation harness
#[derive(Debug, thiserror::Error)]
pub enum BotcheckError {
    /// Question file does not exist or cannot be opened
    #[error("File {} not found.", .0.display())]
    NotFound(PathBuf),

    /// Question file is not a list of single-entry objects
    #[error("Error parsing JSON in file {}: {reason}", .path.display())]
    Format { path: PathBuf, reason: String },

    /// Bot or reference model could not be queried
    #[error("Bot unavailable: {0}")]
    BotUnavailable(String),

    /// Aggregate score below the required bar
    #[error("{check}: got {actual}, needed {required}")]
    ThresholdNotMet {
        check: String,
        actual: String,
        required: String,
    },

    /// Check graph is malformed (unknown prerequisite, duplicate name, cycle)
    #[error("Check graph error: {0}")]
    Graph(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport-level timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl BotcheckError {
    /// Build a `ThresholdNotMet` from matched/total/required counts.
    pub fn below_count(
        check: impl Into<String>,
        matched: usize,
        total: usize,
        required: usize,
    ) -> Self {
        BotcheckError::ThresholdNotMet {
            check: check.into(),
            actual: format!("{}/{}", matched, total),
            required: format!(">= {}", required),
        }
    }

    /// Build a `ThresholdNotMet` for a duration over its limit.
    pub fn too_slow(check: impl Into<String>, elapsed: Duration, limit: Duration) -> Self {
        BotcheckError::ThresholdNotMet {
            check: check.into(),
            actual: format!("{:.2}s", elapsed.as_secs_f64()),
            required: format!("<= {:.2}s", limit.as_secs_f64()),
        }
    }

    /// Whether the error comes from talking to a model rather than from the harness itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, BotcheckError::BotUnavailable(_) | BotcheckError::Timeout(_))
    }
}

impl From<String> for BotcheckError {
    fn from(s: String) -> Self {
        BotcheckError::Other(s)
    }
}

impl From<&str> for BotcheckError {
    fn from(s: &str) -> Self {
        BotcheckError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for BotcheckError {
    fn from(err: anyhow::Error) -> Self {
        BotcheckError::Other(err.to_string())
    }
}
