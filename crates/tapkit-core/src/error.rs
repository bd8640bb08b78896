//! Error types for the conversation boundary.

use thiserror::Error;

/// Errors reported by a [`Conversation`](crate::Conversation) implementation.
#[derive(Debug, Clone, Error)]
pub enum ConversationError {
    /// The messaging network rejected or failed to deliver the content.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// The conversation does not exist or is no longer visible.
    #[error("conversation '{id}' not found")]
    NotFound {
        /// The missing conversation id.
        id: String,
    },

    /// The conversation was closed by the client.
    #[error("conversation closed")]
    Closed,

    /// Content could not be encoded for the wire.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ConversationError {
    /// Creates a send failure.
    pub fn send_failed(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }
}

impl From<serde_json::Error> for ConversationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for conversation operations.
pub type ConversationResult<T> = Result<T, ConversationError>;
