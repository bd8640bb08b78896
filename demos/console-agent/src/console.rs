//! A conversation rendered on the terminal.

use std::io::Write;

use async_trait::async_trait;
use parking_lot::Mutex;
use tapkit::core::{
    ActionSet, ActionStyle, Content, Conversation, ConversationError, ConversationResult,
    Intent, Member, SentMessage,
};

/// Prints everything the agent sends and remembers the last menu so the user
/// can pick an entry by number.
pub struct ConsoleConversation {
    id: String,
    members: Vec<Member>,
    last_actions: Mutex<Option<ActionSet>>,
    sent: Mutex<usize>,
}

impl ConsoleConversation {
    pub fn new(id: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            id: id.into(),
            members,
            last_actions: Mutex::new(None),
            sent: Mutex::new(0),
        }
    }

    /// Turns a line typed by the user into message content.
    ///
    /// `!<id>` taps the action with that id, a bare number taps the n-th entry
    /// of the last menu; anything else is text.
    pub fn parse_input(&self, line: &str) -> Content {
        if let Some(id) = line.strip_prefix('!') {
            return Intent::new(id.trim()).into();
        }
        if let Ok(n) = line.parse::<usize>()
            && let Some(action) = self
                .last_actions
                .lock()
                .as_ref()
                .and_then(|set| set.actions.get(n.wrapping_sub(1)))
        {
            return Intent::new(action.id.clone()).into();
        }
        line.to_string().into()
    }

    fn render(content: &Content) -> String {
        match content {
            Content::Text(text) => format!("🤖 {text}"),
            Content::Intent(intent) => format!("👆 {}", intent.action_id),
            Content::Actions(set) => {
                let mut out = format!("🤖 {}", set.description);
                for (i, action) in set.actions.iter().enumerate() {
                    let marker = match action.style {
                        Some(ActionStyle::Danger) => " (!)",
                        _ => "",
                    };
                    out.push_str(&format!(
                        "\n   [{}] {}{marker}  !{}",
                        i + 1,
                        action.label,
                        action.id
                    ));
                }
                out
            }
            Content::WalletSendCalls(calls) => {
                let body = serde_json::to_string_pretty(calls)
                    .unwrap_or_else(|e| format!("<unprintable: {e}>"));
                format!("🧾 Wallet request on chain {}:\n{body}", calls.chain_id)
            }
        }
    }
}

#[async_trait]
impl Conversation for ConsoleConversation {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, content: Content) -> ConversationResult<SentMessage> {
        if let Content::Actions(set) = &content {
            *self.last_actions.lock() = Some(set.clone());
        }

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", Self::render(&content))
            .map_err(|e| ConversationError::SendFailed(e.to_string()))?;

        let mut sent = self.sent.lock();
        *sent += 1;
        Ok(SentMessage {
            id: format!("console-{sent}"),
            conversation_id: self.id.clone(),
            content,
        })
    }

    async fn members(&self) -> ConversationResult<Vec<Member>> {
        Ok(self.members.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapkit::core::Action;

    fn conversation_with_menu() -> ConsoleConversation {
        let conv = ConsoleConversation::new("console", Vec::new());
        *conv.last_actions.lock() = Some(ActionSet {
            id: "main-menu".into(),
            description: "Pick one".into(),
            actions: vec![Action::new("wallet", "Wallet"), Action::new("help", "Help")],
        });
        conv
    }

    #[test]
    fn test_parse_input() {
        let conv = conversation_with_menu();
        assert_eq!(conv.parse_input("2"), Content::from(Intent::new("help")));
        assert_eq!(conv.parse_input("!yes-3"), Content::from(Intent::new("yes-3")));
        assert_eq!(conv.parse_input("3"), Content::from("3"));
        assert_eq!(conv.parse_input("0"), Content::from("0"));
        assert_eq!(conv.parse_input("gm"), Content::from("gm"));
    }

    #[test]
    fn test_render_actions() {
        let set = ActionSet {
            id: "confirm-1".into(),
            description: "Sure?".into(),
            actions: vec![
                Action::new("yes-1", "✅ Yes"),
                Action::new("no-1", "❌ No").with_style(ActionStyle::Danger),
            ],
        };
        assert_eq!(
            ConsoleConversation::render(&Content::Actions(set)),
            "🤖 Sure?\n   [1] ✅ Yes  !yes-1\n   [2] ❌ No (!)  !no-1"
        );
    }
}
