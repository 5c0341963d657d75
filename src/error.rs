//! Error types for the campus assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Startup Invariants
    // =============================

    #[error("Question '{0}' has no canned response")]
    MissingResponse(String),

    #[error("Question id '{0}' is declared more than once")]
    DuplicateQuestion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // Request Errors
    // =============================

    #[error("Input is empty")]
    EmptyInput,

    #[error("Unknown question category: {0}")]
    UnknownCategory(String),

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Session not found: {0}")]
    SessionNotFound(uuid::Uuid),

    #[error("Reply was cancelled before it was delivered")]
    ReplyCancelled,

    // =============================
    // External Library Conversions
    // =============================

    #[error("Invalid session id: {0}")]
    InvalidSessionId(#[from] uuid::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
