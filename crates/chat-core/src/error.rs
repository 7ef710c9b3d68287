//! Error Types

use thiserror::Error;

/// Result type alias for command dispatch
pub type Result<T> = std::result::Result<T, ChatError>;

/// Chat surface error types
#[derive(Error, Debug)]
pub enum ChatError {
    /// Command not found in registry
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Command arguments failed validation
    #[error("Command validation error: {0}")]
    Validation(String),

    /// Command execution failed
    #[error("Command execution error: {0}")]
    Execution(String),

    /// Free-text argument could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Backing service temporarily unable to answer
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl ChatError {
    /// Check if the caller may simply try again later
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::Unavailable(_) | ChatError::Io(_))
    }

    /// Convert to a message suitable for a chat reply
    pub fn user_message(&self) -> String {
        match self {
            ChatError::CommandNotFound(name) => {
                format!("Unknown command '{}'. Use 'help' to list commands.", name)
            }
            ChatError::Validation(msg) | ChatError::Parse(msg) => format!("❌ {}", msg),
            ChatError::Execution(msg) => format!("Command failed: {}", msg),
            ChatError::Unavailable(_) => "❌ Data is currently unavailable. Please try again later.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        ChatError::Other(err.to_string())
    }
}
