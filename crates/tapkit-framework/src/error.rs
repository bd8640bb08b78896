//! Error types for the tapkit framework.

use thiserror::Error;

use tapkit_core::ConversationError;

pub use tower::BoxError;

/// Errors returned by framework helpers (menus, prompts, builders).
///
/// Handler faults are carried as [`BoxError`] so that any error type can
/// escape a handler; these variants describe the framework's own failures.
#[derive(Debug, Clone, Error)]
pub enum FrameworkError {
    /// Sending into the conversation failed.
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    /// A menu id was not found in the app configuration.
    #[error("menu not found: {id}")]
    MenuNotFound {
        /// The missing menu id.
        id: String,
    },

    /// User input did not pass validation.
    #[error(transparent)]
    Validation(#[from] crate::validators::ValidationError),
}

impl FrameworkError {
    /// Creates a menu-not-found error.
    pub fn menu_not_found(id: impl Into<String>) -> Self {
        Self::MenuNotFound { id: id.into() }
    }
}

/// Result type for framework operations.
pub type FrameworkResult<T> = Result<T, FrameworkError>;
