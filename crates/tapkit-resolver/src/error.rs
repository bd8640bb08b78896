//! Error types for name resolution.

use thiserror::Error;

/// Errors raised while looking up a name.
///
/// [`IdentifierResolver`](crate::IdentifierResolver) never surfaces these to
/// callers; they are logged and turned into "unresolved".
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The profile service answered with a non-success status.
    #[error("profile lookup for {name:?} failed with status {status}")]
    Status { name: String, status: u16 },

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot carry a path.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

/// Result type for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
