//! Matcher system for ordinary (non-intent) messages.
//!
//! A [`Matcher`] groups handlers together with a common "check" rule. Only
//! when the check passes are the handlers executed, in the order they were
//! added. A blocking matcher stops the matchers after it.
//!
//! ```rust,ignore
//! let matcher = Matcher::new()
//!     .name("help")
//!     .check(|ctx| ctx.text().is_some_and(|t| t.starts_with('/')))
//!     .block(true)
//!     .handler(|ctx| async move { show_help(&ctx).await });
//! ```
//!
//! [`MatcherChain`] is the tower service that runs a list of matchers; it is
//! the inner service behind the [`InlineActionsLayer`](crate::InlineActionsLayer).

use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tracing::{debug, error, trace};

use crate::context::MessageContext;
use crate::error::BoxError;
use crate::handler::{ActionHandler, HandlerResponse, into_handler};
use crate::middleware::DispatchOutcome;

/// A type-erased check function.
pub type CheckFn = Arc<dyn Fn(&MessageContext) -> bool + Send + Sync>;

/// Internal data for a Matcher.
///
/// Wrapped in an `Arc` so matchers clone cheaply; `Arc::make_mut` gives
/// copy-on-write while building.
#[derive(Clone)]
struct MatcherInner {
    check_fn: Option<CheckFn>,
    handlers: Vec<ActionHandler>,
    block: bool,
    name: Option<String>,
}

/// A group of handlers sharing a check rule.
#[derive(Clone)]
pub struct Matcher {
    inner: Arc<MatcherInner>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    /// Creates a matcher with no check; it matches every message.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MatcherInner {
                check_fn: None,
                handlers: Vec::new(),
                block: false,
                name: None,
            }),
        }
    }

    fn inner_mut(&mut self) -> &mut MatcherInner {
        Arc::make_mut(&mut self.inner)
    }

    /// Sets a name for this matcher (shown in logs).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner_mut().name = Some(name.into());
        self
    }

    /// Sets the check function.
    pub fn check<F>(mut self, f: F) -> Self
    where
        F: Fn(&MessageContext) -> bool + Send + Sync + 'static,
    {
        self.inner_mut().check_fn = Some(Arc::new(f));
        self
    }

    /// Sets whether a match stops the matchers that follow.
    pub fn block(mut self, block: bool) -> Self {
        self.inner_mut().block = block;
        self
    }

    /// Adds a handler. Handlers run in the order they are added.
    pub fn handler<F, Fut, R>(mut self, f: F) -> Self
    where
        F: Fn(Arc<MessageContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: HandlerResponse,
    {
        self.inner_mut().handlers.push(into_handler(f));
        self
    }

    /// Adds a pre-built handler.
    pub fn handler_boxed(mut self, handler: ActionHandler) -> Self {
        self.inner_mut().handlers.push(handler);
        self
    }

    pub fn matches(&self, ctx: &MessageContext) -> bool {
        match &self.inner.check_fn {
            Some(f) => f(ctx),
            None => true,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.inner.block
    }

    pub fn handler_count(&self) -> usize {
        self.inner.handlers.len()
    }

    pub fn get_name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Runs all handlers if the check passes.
    ///
    /// Returns `true` if the check passed. Handler errors are logged and do
    /// not stop the remaining handlers.
    pub async fn execute(&self, ctx: Arc<MessageContext>) -> bool {
        let name = self.inner.name.as_deref().unwrap_or("unnamed");

        if !self.matches(&ctx) {
            trace!(matcher = name, "Matcher check failed, skipping");
            return false;
        }

        debug!(
            matcher = name,
            handler_count = self.inner.handlers.len(),
            "Matcher check passed, executing handlers"
        );

        for (i, handler) in self.inner.handlers.iter().enumerate() {
            trace!(matcher = name, handler_index = i, "Executing handler");
            if let Err(e) = handler(Arc::clone(&ctx)).await {
                error!(matcher = name, handler_index = i, "Handler error: {e}");
            }
        }

        true
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("name", &self.inner.name)
            .field("block", &self.inner.block)
            .field("handler_count", &self.inner.handlers.len())
            .finish()
    }
}

// ============================================================================
// MatcherChain
// ============================================================================

/// Runs matchers in order, honouring blocking matchers and
/// [`stop_propagation`](MessageContext::stop_propagation).
#[derive(Debug, Clone, Default)]
pub struct MatcherChain {
    matchers: Arc<Vec<Matcher>>,
}

impl MatcherChain {
    pub fn new(matchers: Vec<Matcher>) -> Self {
        Self {
            matchers: Arc::new(matchers),
        }
    }

    pub fn push(&mut self, matcher: Matcher) {
        Arc::make_mut(&mut self.matchers).push(matcher);
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub async fn run(&self, ctx: Arc<MessageContext>) -> DispatchOutcome {
        let mut any_matched = false;

        for matcher in self.matchers.iter() {
            if matcher.execute(Arc::clone(&ctx)).await {
                any_matched = true;

                if matcher.is_blocking() || !ctx.is_propagating() {
                    debug!(
                        matcher = matcher.get_name().unwrap_or("unnamed"),
                        "Propagation stopped"
                    );
                    break;
                }
            }
        }

        if any_matched {
            DispatchOutcome::Matched
        } else {
            DispatchOutcome::Unhandled
        }
    }
}

impl Service<Arc<MessageContext>> for MatcherChain {
    type Response = DispatchOutcome;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<DispatchOutcome, BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Arc<MessageContext>) -> Self::Future {
        let chain = self.clone();
        async move { Ok(chain.run(ctx).await) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ActionIds;
    use crate::matcher_builders::{on_command, on_content, on_prefix};
    use crate::registry::ActionRegistry;
    use crate::session::Session;
    use tapkit_core::{InboundMessage, Intent, MemoryConversation};

    fn ctx(content: impl Into<tapkit_core::Content>) -> Arc<MessageContext> {
        let conv = MemoryConversation::new("c1").boxed();
        Arc::new(MessageContext::new(
            InboundMessage::new("c1", "sender", content),
            conv,
            Arc::new(Session::new("c1")),
            Arc::new(ActionRegistry::new("shared")),
            ActionIds::new(),
        ))
    }

    #[test]
    fn test_builders_check() {
        let help = ctx("/help now");
        assert!(on_command("/help").matches(&help));
        assert!(!on_command("/hel").matches(&help));
        assert!(on_prefix("/").matches(&help));
        assert!(on_content("text").matches(&help));
        assert!(!on_content("intent").matches(&help));

        let intent = ctx(Intent::new("x"));
        assert!(!on_prefix("/").matches(&intent));
        assert!(on_content("intent").matches(&intent));
    }

    #[test]
    fn test_execute_runs_all_handlers_despite_errors() {
        let matcher = Matcher::new()
            .name("both")
            .handler(|_ctx| async { Err::<(), BoxError>("first failed".into()) })
            .handler(|_ctx| async { "second".to_string() });
        assert_eq!(matcher.handler_count(), 2);

        let ctx = ctx("hi");
        assert!(tokio_test::block_on(matcher.execute(Arc::clone(&ctx))));
    }

    #[test]
    fn test_chain_reports_unhandled() {
        let chain = MatcherChain::new(vec![on_command("/start")]);
        let outcome = tokio_test::block_on(chain.run(ctx("hello")));
        assert_eq!(outcome, DispatchOutcome::Unhandled);
        assert!(MatcherChain::default().is_empty());
    }
}
