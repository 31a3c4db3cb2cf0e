//! Error types for docent

use thiserror::Error;

/// Main error type for docent operations
#[derive(Debug, Error)]
pub enum DocentError {
    /// Non-2xx API response with the server-supplied detail message
    #[error("API error ({status}): {detail}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Detail message from the response body
        detail: String,
    },

    /// Rejected credentials or expired session (401/403)
    #[error("Unauthorized ({status}): sign in again")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failure while reading a streamed response body
    #[error("Stream error: {0}")]
    Stream(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error (generic)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using DocentError
pub type Result<T> = std::result::Result<T, DocentError>;

impl DocentError {
    /// Create an API error from a status code and detail message
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        DocentError::Api {
            status,
            detail: detail.into(),
        }
    }

    /// Create a stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        DocentError::Stream(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        DocentError::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DocentError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        DocentError::NotFound(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        DocentError::Other(msg.into())
    }

    /// True for 401/403 responses
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DocentError::Unauthorized { .. })
    }

    /// The detail message shown in place of an answer when a send fails
    /// before streaming starts
    pub fn user_message(&self) -> String {
        match self {
            DocentError::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}
