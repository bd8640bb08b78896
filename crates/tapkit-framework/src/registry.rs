//! Action registry.
//!
//! Maps action ids to [`ActionHandler`]s. Registration never fails: a second
//! registration under the same id replaces the first and logs a warning.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::handler::ActionHandler;

/// A mapping from action id to handler.
///
/// The dispatcher owns one shared registry for handlers installed at start-up,
/// and every [`Session`](crate::session::Session) owns one for the ephemeral
/// actions created while talking to that conversation.
pub struct ActionRegistry {
    /// Label used in log output ("shared" or a conversation id).
    scope: String,
    handlers: RwLock<HashMap<String, ActionHandler>>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `handler` under `id`.
    ///
    /// Returns `true` if an existing handler was replaced.
    pub fn register(&self, id: impl Into<String>, handler: ActionHandler) -> bool {
        let id = id.into();
        let replaced = self.handlers.write().insert(id.clone(), handler).is_some();
        if replaced {
            warn!(scope = %self.scope, action_id = %id, "Action already registered, overwriting");
        } else {
            debug!(scope = %self.scope, action_id = %id, "Registered action");
        }
        replaced
    }

    /// Looks up the handler for `id`.
    pub fn get(&self, id: &str) -> Option<ActionHandler> {
        self.handlers.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.read().contains_key(id)
    }

    /// Returns all registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.handlers.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Removes every handler.
    pub fn clear(&self) {
        self.handlers.write().clear();
        info!(scope = %self.scope, "Cleared all registered actions");
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("scope", &self.scope)
            .field("handler_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::reply_with;

    #[test]
    fn test_register_reports_overwrite() {
        let registry = ActionRegistry::new("test");
        assert!(!registry.register("a", reply_with("one")));
        assert!(registry.register("a", reply_with("two")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_are_sorted() {
        let registry = ActionRegistry::new("test");
        registry.register("b", reply_with("b"));
        registry.register("a", reply_with("a"));
        assert_eq!(registry.ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_clear() {
        let registry = ActionRegistry::new("test");
        registry.register("a", reply_with("a"));
        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
        assert!(registry.get("a").is_none());
    }
}
