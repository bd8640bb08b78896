//! The context handed to every handler.
//!
//! A [`MessageContext`] is created once per inbound message and shared (behind
//! an `Arc`) by the middleware, the action handler or the matchers that run
//! for it. It bundles:
//!
//! - the inbound message and the conversation it came from
//! - the conversation's [`Session`] (ephemeral actions, navigation state)
//! - the dispatcher's shared registry and id source
//! - a propagation flag for the matcher chain

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::FrameworkResult;
use crate::handler::ActionHandler;
use crate::ids::ActionIds;
use crate::registry::ActionRegistry;
use crate::session::Session;
use tapkit_core::{BoxedConversation, Content, InboundMessage, Intent, SentMessage};

pub struct MessageContext {
    message: InboundMessage,
    conversation: BoxedConversation,
    session: Arc<Session>,
    shared: Arc<ActionRegistry>,
    ids: ActionIds,
    /// Cleared by any handler that calls [`MessageContext::stop_propagation`].
    is_propagating: AtomicBool,
}

impl MessageContext {
    pub(crate) fn new(
        message: InboundMessage,
        conversation: BoxedConversation,
        session: Arc<Session>,
        shared: Arc<ActionRegistry>,
        ids: ActionIds,
    ) -> Self {
        Self {
            message,
            conversation,
            session,
            shared,
            ids,
            is_propagating: AtomicBool::new(true),
        }
    }

    // ─── Inbound message ──────────────────────────────────────────────────────

    pub fn message(&self) -> &InboundMessage {
        &self.message
    }

    pub fn content(&self) -> &Content {
        &self.message.content
    }

    /// The text body, if this is a text message.
    pub fn text(&self) -> Option<&str> {
        self.message.text()
    }

    /// The intent, if this message is an action selection.
    pub fn intent(&self) -> Option<&Intent> {
        self.message.intent()
    }

    pub fn sender_address(&self) -> Option<&str> {
        self.message.sender_address.as_deref()
    }

    // ─── Conversation ─────────────────────────────────────────────────────────

    pub fn conversation(&self) -> &BoxedConversation {
        &self.conversation
    }

    pub async fn send(&self, content: impl Into<Content>) -> FrameworkResult<SentMessage> {
        Ok(self.conversation.send(content.into()).await?)
    }

    pub async fn send_text(&self, text: &str) -> FrameworkResult<SentMessage> {
        Ok(self.conversation.send_text(text).await?)
    }

    // ─── Actions ──────────────────────────────────────────────────────────────

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The dispatcher-wide registry of handlers installed at start-up.
    pub fn shared_registry(&self) -> &Arc<ActionRegistry> {
        &self.shared
    }

    pub fn ids(&self) -> &ActionIds {
        &self.ids
    }

    /// Registers an ephemeral action visible only in this conversation.
    pub fn register_action(&self, id: impl Into<String>, handler: ActionHandler) -> bool {
        self.session.registry().register(id, handler)
    }

    /// Finds the handler for `action_id`: this conversation's actions first,
    /// then the shared registry.
    pub fn find_action(&self, action_id: &str) -> Option<ActionHandler> {
        self.session
            .registry()
            .get(action_id)
            .or_else(|| self.shared.get(action_id))
    }

    // ─── Propagation ──────────────────────────────────────────────────────────

    /// Stops the remaining matchers from seeing this message.
    pub fn stop_propagation(&self) {
        self.is_propagating.store(false, Ordering::SeqCst);
    }

    pub fn is_propagating(&self) -> bool {
        self.is_propagating.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageContext")
            .field("message_id", &self.message.id)
            .field("conversation", &self.conversation.id())
            .field("content_type", &self.message.content.type_id())
            .field("is_propagating", &self.is_propagating())
            .finish_non_exhaustive()
    }
}
