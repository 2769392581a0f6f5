//! Error types for reelex.

use thiserror::Error;

use crate::models::ValidationError;

/// Result type alias using reelex's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reelex operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Strict record construction failed (recoverable via fallback)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Generation backend call failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Generation backend reported quota/rate-limit exhaustion
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Response text was not valid JSON after fence unwrapping
    #[error("Parse error: {0}")]
    Parse(String),

    /// Category detection returned no usable label
    #[error("Detection error: {0}")]
    Detection(String),

    /// Memory store operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Task not found in the task registry
    #[error("Task not found: {0}")]
    TaskNotFound(uuid::Uuid),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// Whether this error is the quota signal that permits a single
    /// lower-tier retry of a generation call.
    pub fn is_quota(&self) -> bool {
        matches!(self, Error::QuotaExhausted(_))
    }
}
