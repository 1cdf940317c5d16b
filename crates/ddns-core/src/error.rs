//! Error types for the DDNS updater
//!
//! This module defines all error types used throughout the crate.
//!
//! "Zone not found" and "ambiguous zone" are not errors: the engine reports
//! them as [`ReconciliationResult`](crate::ReconciliationResult) variants.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed input, detected before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Identity call failed for a reason other than a provider error document
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Structured provider-side error; carries the raw JSON response body verbatim
    #[error("API error: {0}")]
    Api(String),

    /// Non-success HTTP response without a JSON body
    #[error("Transport error: HTTP {status}")]
    Transport {
        /// HTTP status code
        status: u16,
    },

    /// The request never produced a response (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (fatal, not retryable)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an API error from a raw response body
    pub fn api(body: impl Into<String>) -> Self {
        Self::Api(body.into())
    }

    /// Create a transport error for an HTTP status
    pub fn transport(status: u16) -> Self {
        Self::Transport { status }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a later re-run of the same reconciliation may succeed
    ///
    /// Network failures, rate limiting and provider-side 5xx responses are
    /// transient. Provider error documents, validation and configuration
    /// errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Transport { status } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::http("connection reset").is_transient());
        assert!(Error::transport(503).is_transient());
        assert!(Error::transport(429).is_transient());
        assert!(!Error::transport(404).is_transient());
        assert!(!Error::api(r#"{"unauthorized":{}}"#).is_transient());
        assert!(!Error::config("no dns endpoint").is_transient());
    }

    #[test]
    fn test_api_error_keeps_raw_body() {
        let body = r#"{"unauthorized":{"message":"Invalid user / password","code":401}}"#;
        match Error::api(body) {
            Error::Api(raw) => assert_eq!(raw, body),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
