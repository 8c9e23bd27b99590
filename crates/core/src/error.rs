//! Core error types

use thiserror::Error;

/// Core error type for ZeroBus
#[derive(Debug, Error)]
pub enum CoreError {
    /// Generic error
    #[error("Core error: {0}")]
    Generic(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
