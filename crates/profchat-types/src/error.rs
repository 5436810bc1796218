use thiserror::Error;

/// Errors from transcript and chat exchange operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no open turn to extend")]
    NoOpenTurn,

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("an exchange is already in progress")]
    ConcurrentExchange,
}

impl ChatError {
    pub fn transport(message: impl Into<String>) -> Self {
        ChatError::Transport {
            message: message.into(),
        }
    }
}

/// Errors from professor analytics lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no analytics found for '{0}'")]
    NotFound(String),

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("decode error: {0}")]
    Decode(String),
}
