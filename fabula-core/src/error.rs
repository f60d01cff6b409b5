//! Error types for fabula-core.

use thiserror::Error;

/// Result type for fabula operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fabula operations.
///
/// Absent reference data is never an error: scorers report it through their
/// `reference_incomplete` flag instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Raw story text is required but neither supplied nor embedded in a document.
    #[error("Missing text: {0}")]
    MissingText(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error (bad TOML, unreadable taxonomy file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Evaluation error.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a missing text error.
    #[must_use]
    pub fn missing_text(msg: impl Into<String>) -> Self {
        Self::MissingText(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an evaluation error.
    #[must_use]
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}
