//! Error types for recap-core

use thiserror::Error;

/// Main error type for the recap-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Invalid user input, rejected before any work begins
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for recap-core
pub type Result<T> = std::result::Result<T, Error>;
