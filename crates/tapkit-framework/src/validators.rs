//! Validation helpers for identifiers typed by users.

use thiserror::Error;

/// Rejection reasons for user-supplied identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid Inbox ID format (64 hex chars)")]
    InboxId,

    #[error("Invalid Ethereum address format (0x + 40 hex chars)")]
    EthereumAddress,
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns `true` for exactly 64 hex characters.
pub fn is_inbox_id(input: &str) -> bool {
    is_hex(input, 64)
}

/// Returns `true` for `0x` followed by exactly 40 hex characters.
pub fn is_ethereum_address(input: &str) -> bool {
    input
        .strip_prefix("0x")
        .is_some_and(|hex| is_hex(hex, 40))
}

/// Validates an inbox id, ignoring surrounding whitespace.
pub fn validate_inbox_id(input: &str) -> Result<(), ValidationError> {
    if is_inbox_id(input.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InboxId)
    }
}

/// Validates an Ethereum address, ignoring surrounding whitespace.
pub fn validate_ethereum_address(input: &str) -> Result<(), ValidationError> {
    if is_ethereum_address(input.trim()) {
        Ok(())
    } else {
        Err(ValidationError::EthereumAddress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbox_id() {
        assert!(validate_inbox_id(&format!(" {} ", "ab".repeat(32))).is_ok());
        assert_eq!(validate_inbox_id("abc"), Err(ValidationError::InboxId));
        assert!(validate_inbox_id(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_ethereum_address() {
        let addr = format!("0x{}", "Ab".repeat(20));
        assert!(validate_ethereum_address(&addr).is_ok());
        assert!(validate_ethereum_address(&format!("0X{}", "ab".repeat(20))).is_err());
        assert!(validate_ethereum_address("0x1234").is_err());
        assert_eq!(
            ValidationError::EthereumAddress.to_string(),
            "Invalid Ethereum address format (0x + 40 hex chars)"
        );
    }
}
