//! The conversation boundary.
//!
//! A [`Conversation`] is the only surface the rest of tapkit uses to talk to
//! the messaging network. Session management, transport and encryption stay
//! behind it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use crate::content::{ActionSet, Content};
use crate::error::{ConversationError, ConversationResult};
use crate::message::Member;

/// A message that was successfully handed to the network.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub id: String,
    pub conversation_id: String,
    pub content: Content,
}

/// A DM or group conversation.
///
/// Implementations wrap a messaging SDK handle. Only [`send`](Self::send) and
/// [`members`](Self::members) are required; the typed send helpers delegate
/// to `send`.
#[async_trait]
pub trait Conversation: Send + Sync {
    /// Returns the conversation id.
    fn id(&self) -> &str;

    /// Sends any content into the conversation.
    async fn send(&self, content: Content) -> ConversationResult<SentMessage>;

    /// Lists the current members.
    async fn members(&self) -> ConversationResult<Vec<Member>>;

    /// Sends a plain text message.
    async fn send_text(&self, text: &str) -> ConversationResult<SentMessage> {
        self.send(Content::Text(text.to_string())).await
    }

    /// Sends a menu of tappable actions.
    async fn send_actions(&self, actions: ActionSet) -> ConversationResult<SentMessage> {
        self.send(Content::Actions(actions)).await
    }
}

/// A shared conversation trait object.
pub type BoxedConversation = Arc<dyn Conversation>;

// ============================================================================
// MemoryConversation
// ============================================================================

/// An in-process conversation that records everything sent to it.
///
/// Useful for tests and local demos where no messaging network is available.
#[derive(Debug)]
pub struct MemoryConversation {
    id: String,
    members: Vec<Member>,
    outbox: Mutex<Vec<SentMessage>>,
    closed: AtomicBool,
}

impl MemoryConversation {
    /// Creates an empty conversation with no members.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            members: Vec::new(),
            outbox: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Sets the member list returned by [`Conversation::members`].
    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    /// Wraps this conversation into a [`BoxedConversation`].
    pub fn boxed(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Makes every further send fail with [`ConversationError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Returns a snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.outbox.lock().clone()
    }

    /// Drains and returns everything sent so far.
    pub fn take_sent(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.outbox.lock())
    }

    /// Returns the bodies of all text messages sent so far.
    pub fn texts(&self) -> Vec<String> {
        self.outbox
            .lock()
            .iter()
            .filter_map(|m| m.content.as_text().map(str::to_string))
            .collect()
    }

    /// Returns all action sets sent so far.
    pub fn action_sets(&self) -> Vec<ActionSet> {
        self.outbox
            .lock()
            .iter()
            .filter_map(|m| m.content.as_actions().cloned())
            .collect()
    }
}

#[async_trait]
impl Conversation for MemoryConversation {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, content: Content) -> ConversationResult<SentMessage> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ConversationError::Closed);
        }

        // Content must survive the wire encoding even when nothing leaves the process.
        serde_json::to_value(&content)?;

        let sent = SentMessage {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: self.id.clone(),
            content,
        };
        trace!(conversation = %self.id, content_type = sent.content.type_id(), "Recorded outbound message");
        self.outbox.lock().push(sent.clone());
        Ok(sent)
    }

    async fn members(&self) -> ConversationResult<Vec<Member>> {
        Ok(self.members.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Action;

    #[tokio::test]
    async fn test_memory_conversation_records_sends() {
        let conv = MemoryConversation::new("conv-1");
        conv.send_text("hello").await.unwrap();
        conv.send_actions(ActionSet {
            id: "menu".into(),
            description: "Pick".into(),
            actions: vec![Action::new("a", "A")],
        })
        .await
        .unwrap();

        assert_eq!(conv.texts(), vec!["hello".to_string()]);
        assert_eq!(conv.action_sets().len(), 1);
        assert_eq!(conv.take_sent().len(), 2);
        assert!(conv.sent().is_empty());
    }

    #[tokio::test]
    async fn test_closed_conversation_rejects_sends() {
        let conv = MemoryConversation::new("conv-1");
        conv.close();
        let err = conv.send_text("hello").await.unwrap_err();
        assert!(matches!(err, ConversationError::Closed));
    }

    #[tokio::test]
    async fn test_members_are_returned() {
        let conv = MemoryConversation::new("group")
            .with_members(vec![Member::with_address("inbox-a", "0xaaa")]);
        let members = conv.members().await.unwrap();
        assert_eq!(members[0].ethereum_address(), Some("0xaaa"));
    }
}
