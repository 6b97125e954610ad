// ABOUTME: Error types for sandbox inspection operations
// ABOUTME: Classifies configuration, not-found, timeout, provider, and argument failures

use thiserror::Error;

/// Result type for inspector operations
pub type Result<T> = std::result::Result<T, InspectorError>;

/// Main error type for inspector operations
#[derive(Error, Debug)]
pub enum InspectorError {
    /// Missing or invalid local configuration (e.g. no API key)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Target sandbox does not exist or is already terminated
    #[error("Sandbox not found: {0}")]
    NotFound(String),

    /// Remote operation exceeded its time bound
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Any other failure reported by the remote provider
    #[error("Provider error: {0}")]
    Provider(String),

    /// Caller passed an unacceptable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl InspectorError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, InspectorError::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, InspectorError::Timeout(_))
    }
}

impl From<reqwest::Error> for InspectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Provider(err.to_string())
        }
    }
}

impl From<serde_json::Error> for InspectorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Provider(format!("invalid response payload: {err}"))
    }
}
