//! Message dispatcher.
//!
//! The [`Dispatcher`] owns everything a running agent needs to route a
//! message:
//!
//! - the shared [`ActionRegistry`] with handlers installed at start-up
//! - the [`SessionStore`] holding per-conversation actions and navigation
//! - the [`ActionIds`] counter for ephemeral action ids
//! - the ordered [`Matcher`]s for non-intent messages
//!
//! Each call to [`Dispatcher::dispatch`] builds a [`MessageContext`] and runs
//! it through the service stack:
//!
//! ```text
//! ServiceBuilder
//!   └─ InlineActionsLayer     intent → action handler, stop
//!        └─ MatcherChain      everything else → matchers in order
//! ```
//!
//! ```rust,ignore
//! use tapkit_framework::{Dispatcher, into_handler, on_command};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_action("ping", into_handler(|_ctx| async { "pong".to_string() }));
//! dispatcher.add(on_command("/menu").block(true).handler(|ctx| async move {
//!     show_menu(&ctx, &app, MAIN_MENU).await
//! }));
//!
//! let outcome = dispatcher.dispatch(message, conversation).await;
//! ```

use std::sync::Arc;

use tower::{ServiceBuilder, ServiceExt};
use tracing::{Instrument, debug, debug_span, error};

use crate::context::MessageContext;
use crate::handler::ActionHandler;
use crate::ids::ActionIds;
use crate::matcher::{Matcher, MatcherChain};
use crate::menu::{self, AppConfig};
use crate::middleware::{DispatchOutcome, InlineActionsLayer};
use crate::registry::ActionRegistry;
use crate::session::{Session, SessionStore};
use tapkit_core::{BoxedConversation, InboundMessage};

/// Routes inbound messages to action handlers and matchers.
///
/// Cloning is cheap and clones share registries, sessions and the id
/// counter, so one dispatcher can serve many concurrent tasks.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<ActionRegistry>,
    sessions: Arc<SessionStore>,
    ids: ActionIds,
    chain: MatcherChain,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(ActionRegistry::new("shared")),
            sessions: Arc::new(SessionStore::new()),
            ids: ActionIds::new(),
            chain: MatcherChain::default(),
        }
    }

    /// Adds a matcher. Matchers are checked in the order they are added.
    pub fn add(&mut self, matcher: Matcher) {
        self.chain.push(matcher);
    }

    /// Adds a matcher (builder pattern).
    pub fn with(mut self, matcher: Matcher) -> Self {
        self.add(matcher);
        self
    }

    pub fn matcher_count(&self) -> usize {
        self.chain.len()
    }

    /// Registers a handler visible from every conversation.
    ///
    /// Returns `true` if an existing handler was replaced.
    pub fn register_action(&self, id: impl Into<String>, handler: ActionHandler) -> bool {
        self.shared.register(id, handler)
    }

    /// Registers the actions of an app and returns the shared config.
    ///
    /// See [`menu::install_app`] for the registration order.
    pub fn install_app(
        &self,
        config: AppConfig,
        deferred: impl IntoIterator<Item = (String, ActionHandler)>,
    ) -> Arc<AppConfig> {
        menu::install_app(&self.shared, config, deferred)
    }

    pub fn shared_registry(&self) -> &Arc<ActionRegistry> {
        &self.shared
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn session(&self, conversation_id: &str) -> Arc<Session> {
        self.sessions.get_or_create(conversation_id)
    }

    /// Forgets a conversation's ephemeral actions and navigation state.
    pub fn end_session(&self, conversation_id: &str) -> bool {
        self.sessions.remove(conversation_id).is_some()
    }

    pub fn ids(&self) -> &ActionIds {
        &self.ids
    }

    /// Dispatches one inbound message.
    ///
    /// Never fails: handler faults are reported into the conversation by the
    /// middleware and show up here only as [`IntentStatus::Failed`](crate::IntentStatus).
    pub async fn dispatch(
        &self,
        message: InboundMessage,
        conversation: BoxedConversation,
    ) -> DispatchOutcome {
        let span = debug_span!(
            "dispatch",
            conversation = %conversation.id(),
            content_type = message.content.type_id(),
        );

        async move {
            let session = self.sessions.get_or_create(conversation.id());
            let ctx = Arc::new(MessageContext::new(
                message,
                conversation,
                session,
                Arc::clone(&self.shared),
                self.ids.clone(),
            ));

            let service = ServiceBuilder::new()
                .layer(InlineActionsLayer::new())
                .service(self.chain.clone());

            match service.oneshot(ctx).await {
                Ok(outcome) => {
                    debug!(?outcome, "Dispatch finished");
                    outcome
                }
                Err(e) => {
                    error!("Dispatch failed: {e}");
                    DispatchOutcome::Unhandled
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("shared", &self.shared)
            .field("sessions", &self.sessions.len())
            .field("matcher_count", &self.chain.len())
            .finish()
    }
}
