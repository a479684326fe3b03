//! Error types for Precis.
//!
//! This module defines a unified error enum that covers all error categories
//! in the workspace: configuration, I/O, completion service, tokenizer,
//! input validation, prompt rendering and serialization.

use thiserror::Error;

/// Unified error type for Precis.
///
/// Library functions return `Result<T, AppError>`; chunking problems that can
/// be recovered locally are logged instead of raised.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion service errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tokenizer construction errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Precondition violations (detail out of range, empty delimiter, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
