//! Per-conversation session state.
//!
//! A [`Session`] holds everything that must not leak between conversations:
//! the ephemeral actions created by prompts, the last menu shown and the last
//! action message sent. The [`SessionStore`] creates sessions lazily, keyed by
//! conversation id.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::menu::AppConfig;
use crate::registry::ActionRegistry;
use tapkit_core::SentMessage;

/// The menu most recently shown in a conversation.
#[derive(Debug, Clone)]
pub struct LastMenu {
    pub config: Arc<AppConfig>,
    pub menu_id: String,
}

/// State scoped to a single conversation.
#[derive(Debug)]
pub struct Session {
    conversation_id: String,
    registry: ActionRegistry,
    last_menu: Mutex<Option<LastMenu>>,
    last_sent_actions: Mutex<Option<SentMessage>>,
}

impl Session {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        let conversation_id = conversation_id.into();
        Self {
            registry: ActionRegistry::new(conversation_id.clone()),
            conversation_id,
            last_menu: Mutex::new(None),
            last_sent_actions: Mutex::new(None),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Registry of actions created inside this conversation.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn last_menu(&self) -> Option<LastMenu> {
        self.last_menu.lock().clone()
    }

    pub fn set_last_menu(&self, config: Arc<AppConfig>, menu_id: impl Into<String>) {
        *self.last_menu.lock() = Some(LastMenu {
            config,
            menu_id: menu_id.into(),
        });
    }

    /// The action message most recently sent here, for reply threading.
    pub fn last_sent_actions(&self) -> Option<SentMessage> {
        self.last_sent_actions.lock().clone()
    }

    pub fn set_last_sent_actions(&self, message: SentMessage) {
        *self.last_sent_actions.lock() = Some(message);
    }
}

/// Lazily created sessions, one per conversation.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `conversation_id`, creating it on first use.
    pub fn get_or_create(&self, conversation_id: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.read().get(conversation_id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write();
        Arc::clone(
            sessions
                .entry(conversation_id.to_string())
                .or_insert_with(|| {
                    debug!(conversation = %conversation_id, "Created session");
                    Arc::new(Session::new(conversation_id))
                }),
        )
    }

    pub fn get(&self, conversation_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(conversation_id).cloned()
    }

    /// Drops a session and every ephemeral action it holds.
    pub fn remove(&self, conversation_id: &str) -> Option<Arc<Session>> {
        self.sessions.write().remove(conversation_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::reply_with;

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.get_or_create("a");
        let b = store.get_or_create("b");

        a.registry().register("yes-1", reply_with("a"));

        assert!(a.registry().contains("yes-1"));
        assert!(!b.registry().contains("yes-1"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_or_create_reuses_session() {
        let store = SessionStore::new();
        let first = store.get_or_create("a");
        let second = store.get_or_create("a");
        assert!(Arc::ptr_eq(&first, &second));

        store.remove("a");
        assert!(store.get("a").is_none());
    }
}
