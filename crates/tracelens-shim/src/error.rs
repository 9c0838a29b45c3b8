//! Shim error types.

use thiserror::Error;

/// Failures of the shim itself, as opposed to failures of the user's code.
#[derive(Error, Debug)]
pub enum ShimError {
    #[error("Invalid interpreter command: {0}")]
    InvalidInterpreter(String),

    #[error("Failed to start interpreter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Kernel error: {0}")]
    Kernel(String),

    #[error("Analyze endpoint error: {0}")]
    Endpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for shim operations.
pub type ShimResult<T> = Result<T, ShimError>;
