//! Content types exchanged with a conversation.
//!
//! Every payload that travels through a [`Conversation`](crate::Conversation)
//! is a [`Content`] value. On the wire it is a tagged object:
//!
//! ```json
//! { "contentType": "intent", "content": { "actionId": "check-balance" } }
//! ```
//!
//! The two inline-action payloads are:
//! - [`ActionSet`]: an outbound menu rendered by the client as tappable buttons
//! - [`Intent`]: the inbound selection naming the [`Action`] the user tapped

use serde::{Deserialize, Serialize};

// ============================================================================
// Inline actions
// ============================================================================

/// Visual hint for how a client renders an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStyle {
    /// Regular button.
    #[default]
    Default,
    /// Destructive or cancelling choice.
    Danger,
}

/// A single tappable choice inside an [`ActionSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Identifier echoed back in the [`Intent`] when the user taps this action.
    pub id: String,
    /// Text shown on the button.
    pub label: String,
    /// Optional rendering style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ActionStyle>,
}

impl Action {
    /// Creates an action with the default style.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: None,
        }
    }

    /// Sets the rendering style.
    pub fn with_style(mut self, style: ActionStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// A menu of actions sent to the remote user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSet {
    /// Identifier of the menu itself.
    pub id: String,
    /// Prompt shown above the buttons.
    pub description: String,
    /// Buttons in display order.
    pub actions: Vec<Action>,
}

impl ActionSet {
    /// Returns the action with the given id, if present.
    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// Returns the ids of all actions in display order.
    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.id.as_str())
    }
}

/// Inbound selection correlating a user's tap with a registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// The id of the tapped [`Action`].
    pub action_id: String,
}

impl Intent {
    pub fn new(action_id: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
        }
    }
}

// ============================================================================
// Wallet send calls
// ============================================================================

/// A batch of wallet calls the user is asked to approve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSendCalls {
    pub version: String,
    /// Address the calls are sent from.
    pub from: String,
    /// Hex-encoded chain id, e.g. `0x14a34`.
    pub chain_id: String,
    pub calls: Vec<WalletCall>,
}

/// One contract call inside [`WalletSendCalls`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletCall {
    /// Contract address.
    pub to: String,
    /// Hex-encoded calldata.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

// ============================================================================
// Content
// ============================================================================

/// Any payload a conversation can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType", content = "content", rename_all = "camelCase")]
pub enum Content {
    /// Plain text.
    Text(String),
    /// A user's selection of an action.
    Intent(Intent),
    /// A menu of tappable actions.
    Actions(ActionSet),
    /// A batch of wallet calls.
    WalletSendCalls(WalletSendCalls),
}

impl Content {
    /// Returns the wire tag of this content.
    pub fn type_id(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Intent(_) => "intent",
            Content::Actions(_) => "actions",
            Content::WalletSendCalls(_) => "walletSendCalls",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_intent(&self) -> Option<&Intent> {
        match self {
            Content::Intent(intent) => Some(intent),
            _ => None,
        }
    }

    pub fn as_actions(&self) -> Option<&ActionSet> {
        match self {
            Content::Actions(set) => Some(set),
            _ => None,
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Intent> for Content {
    fn from(intent: Intent) -> Self {
        Content::Intent(intent)
    }
}

impl From<ActionSet> for Content {
    fn from(set: ActionSet) -> Self {
        Content::Actions(set)
    }
}

impl From<WalletSendCalls> for Content {
    fn from(calls: WalletSendCalls) -> Self {
        Content::WalletSendCalls(calls)
    }
}

impl std::fmt::Display for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Content::Text(text) => write!(f, "{text}"),
            Content::Intent(intent) => write!(f, "[intent:{}]", intent.action_id),
            Content::Actions(set) => {
                write!(f, "{}", set.description)?;
                for action in &set.actions {
                    match action.style {
                        Some(ActionStyle::Danger) => write!(f, "\n  [{}] {} (!)", action.id, action.label)?,
                        _ => write!(f, "\n  [{}] {}", action.id, action.label)?,
                    }
                }
                Ok(())
            }
            Content::WalletSendCalls(calls) => {
                write!(f, "[wallet calls: {} on {}]", calls.calls.len(), calls.chain_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_wire_format() {
        let content: Content = serde_json::from_value(json!({
            "contentType": "intent",
            "content": { "actionId": "check-balance" }
        }))
        .unwrap();

        assert_eq!(content.type_id(), "intent");
        assert_eq!(content.as_intent().unwrap().action_id, "check-balance");
    }

    #[test]
    fn test_action_set_omits_missing_style() {
        let set = ActionSet {
            id: "help".into(),
            description: "Choose".into(),
            actions: vec![
                Action::new("a", "A"),
                Action::new("b", "B").with_style(ActionStyle::Danger),
            ],
        };

        let value = serde_json::to_value(Content::from(set)).unwrap();
        assert_eq!(value["contentType"], "actions");
        assert!(value["content"]["actions"][0].get("style").is_none());
        assert_eq!(value["content"]["actions"][1]["style"], "danger");
    }

    #[test]
    fn test_wallet_calls_camel_case() {
        let calls = WalletSendCalls {
            version: "1.0".into(),
            from: "0x01".into(),
            chain_id: "0x2105".into(),
            calls: vec![],
        };
        let value = serde_json::to_value(Content::from(calls)).unwrap();
        assert_eq!(value["contentType"], "walletSendCalls");
        assert_eq!(value["content"]["chainId"], "0x2105");
    }

    #[test]
    fn test_display_lists_actions() {
        let set = ActionSet {
            id: "m".into(),
            description: "Pick one".into(),
            actions: vec![Action::new("x", "Ex")],
        };
        assert_eq!(Content::from(set).to_string(), "Pick one\n  [x] Ex");
    }
}
