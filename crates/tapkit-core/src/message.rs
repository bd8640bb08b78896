//! Inbound messages and conversation members.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::content::{Content, Intent};

/// A message received from a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Message id assigned by the messaging network.
    pub id: String,
    /// Conversation the message was posted to.
    pub conversation_id: String,
    /// Inbox id of the sender.
    pub sender_inbox_id: String,
    /// Ethereum address of the sender, when known.
    pub sender_address: Option<String>,
    /// Decoded payload.
    pub content: Content,
    pub sent_at: SystemTime,
}

impl InboundMessage {
    /// Creates a message stamped with the current time and a random id.
    pub fn new(
        conversation_id: impl Into<String>,
        sender_inbox_id: impl Into<String>,
        content: impl Into<Content>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            sender_inbox_id: sender_inbox_id.into(),
            sender_address: None,
            content: content.into(),
            sent_at: SystemTime::now(),
        }
    }

    /// Sets the sender's Ethereum address.
    pub fn with_sender_address(mut self, address: impl Into<String>) -> Self {
        self.sender_address = Some(address.into());
        self
    }

    /// Returns the text body if this is a text message.
    pub fn text(&self) -> Option<&str> {
        self.content.as_text()
    }

    /// Returns the intent if this message is an action selection.
    pub fn intent(&self) -> Option<&Intent> {
        self.content.as_intent()
    }

    /// Returns `true` for intent messages.
    pub fn is_intent(&self) -> bool {
        self.intent().is_some()
    }
}

/// Kind of account identifier attached to a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Ethereum,
    Passkey,
}

/// One identifier linked to a member's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentifier {
    pub identifier: String,
    pub identifier_kind: IdentifierKind,
}

impl AccountIdentifier {
    pub fn ethereum(address: impl Into<String>) -> Self {
        Self {
            identifier: address.into(),
            identifier_kind: IdentifierKind::Ethereum,
        }
    }
}

/// A participant of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub inbox_id: String,
    #[serde(default)]
    pub account_identifiers: Vec<AccountIdentifier>,
}

impl Member {
    /// Creates a member with a single Ethereum identifier.
    pub fn with_address(inbox_id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            inbox_id: inbox_id.into(),
            account_identifiers: vec![AccountIdentifier::ethereum(address)],
        }
    }

    /// Returns the first Ethereum address linked to this member.
    pub fn ethereum_address(&self) -> Option<&str> {
        self.account_identifiers
            .iter()
            .find(|id| id.identifier_kind == IdentifierKind::Ethereum)
            .map(|id| id.identifier.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_accessors() {
        let msg = InboundMessage::new("conv", "inbox", Intent::new("yes-1"));
        assert!(msg.is_intent());
        assert!(msg.text().is_none());
        assert_eq!(msg.intent().unwrap().action_id, "yes-1");
    }

    #[test]
    fn test_member_ethereum_address_skips_passkeys() {
        let member = Member {
            inbox_id: "inbox".into(),
            account_identifiers: vec![
                AccountIdentifier {
                    identifier: "passkey-1".into(),
                    identifier_kind: IdentifierKind::Passkey,
                },
                AccountIdentifier::ethereum("0xabc"),
            ],
        };
        assert_eq!(member.ethereum_address(), Some("0xabc"));
    }
}
