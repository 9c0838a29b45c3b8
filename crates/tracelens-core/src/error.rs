//! Centralized error types for tracelens.

use thiserror::Error;

/// Errors raised while turning a failure into an explanation.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for tracelens operations.
pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

impl AnalyzeError {
    /// Create a bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create an upstream error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Upstream(_) => "upstream",
            Self::Config(_) => "config",
        }
    }
}
