//! Crate-level error type

use thiserror::Error;

use crate::context::{BudgetError, TokenizerError};
use crate::generation::GenerationError;

/// Result type for session setup and configuration
pub type Result<T> = std::result::Result<T, DialogueError>;

/// Errors that prevent a session from starting.
///
/// Per-turn failures never surface here; the turn controller reports them
/// to the presentation sink instead.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Budget(#[from] BudgetError),

    #[error("Tokenizer setup failed: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("Generator setup failed: {0}")]
    Generator(#[from] GenerationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<::config::ConfigError> for DialogueError {
    fn from(err: ::config::ConfigError) -> Self {
        DialogueError::Configuration(err.to_string())
    }
}
