//! Error types for the gateway client.

use thiserror::Error;

/// Result type alias using the LLM error type.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Error type for gateway operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// The gateway rejected the API key.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The gateway answered with a non-success status.
    #[error("gateway error (HTTP {status}): {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Error message or body excerpt.
        message: String,
    },

    /// The reply body was not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}
