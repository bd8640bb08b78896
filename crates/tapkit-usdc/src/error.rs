//! Error types for USDC operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsdcError {
    #[error("network configuration not found for: {0}")]
    UnknownNetwork(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("rpc request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed rpc response: {0}")]
    Decode(String),
}

pub type UsdcResult<T> = Result<T, UsdcError>;
