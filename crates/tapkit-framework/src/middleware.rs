//! Inline actions middleware.
//!
//! [`InlineActionsLayer`] wraps the ordinary handler chain. Intent messages
//! are routed to the registered action handler and never reach the inner
//! service; every other message is passed through untouched.
//!
//! ```text
//! InboundMessage ──▶ InlineActionsService ──intent──▶ ActionHandler
//!                           │
//!                           └──other──▶ inner service (matchers)
//! ```
//!
//! Faults stay inside the middleware: an unknown action id or a failing
//! handler produce one text reply in the conversation and a log line, and the
//! service still returns `Ok`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tower_layer::Layer;
use tracing::{debug, error, warn};

use crate::context::MessageContext;
use crate::error::BoxError;

/// What happened to an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentStatus {
    /// The handler ran to completion.
    Handled,
    /// The handler returned an error or panicked.
    Failed,
    /// No handler is registered for the action id.
    Unknown,
}

/// What the dispatcher did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message was an intent and was routed by the middleware.
    Intent {
        action_id: String,
        status: IntentStatus,
    },
    /// At least one matcher accepted the message.
    Matched,
    /// Nothing accepted the message.
    Unhandled,
}

/// Routes an intent to its handler and reports faults into the conversation.
pub async fn dispatch_intent(ctx: &Arc<MessageContext>, action_id: &str) -> IntentStatus {
    debug!(
        action_id = %action_id,
        conversation = %ctx.conversation().id(),
        "Processing intent"
    );

    let Some(handler) = ctx.find_action(action_id) else {
        warn!(action_id = %action_id, "Unknown action");
        report(ctx, &format!("❌ Unknown action: {action_id}")).await;
        return IntentStatus::Unknown;
    };

    let result = AssertUnwindSafe(handler(Arc::clone(ctx)))
        .catch_unwind()
        .await;

    match result {
        Ok(Ok(())) => IntentStatus::Handled,
        Ok(Err(e)) => {
            error!(action_id = %action_id, error = %e, "Error in action handler");
            report(ctx, &format!("❌ Error: {e}")).await;
            IntentStatus::Failed
        }
        Err(_) => {
            error!(action_id = %action_id, "Action handler panicked");
            report(ctx, "❌ Error: action handler panicked").await;
            IntentStatus::Failed
        }
    }
}

async fn report(ctx: &MessageContext, text: &str) {
    if let Err(e) = ctx.send_text(text).await {
        error!("Failed to send message: {e}");
    }
}

// ============================================================================
// Layer / Service
// ============================================================================

/// Tower layer that short-circuits intent messages to the action registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineActionsLayer;

impl InlineActionsLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for InlineActionsLayer {
    type Service = InlineActionsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InlineActionsService { inner }
    }
}

/// The service produced by [`InlineActionsLayer`].
#[derive(Debug, Clone)]
pub struct InlineActionsService<S> {
    inner: S,
}

impl<S> Service<Arc<MessageContext>> for InlineActionsService<S>
where
    S: Service<Arc<MessageContext>, Response = DispatchOutcome, Error = BoxError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = DispatchOutcome;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<DispatchOutcome, BoxError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, ctx: Arc<MessageContext>) -> Self::Future {
        if let Some(intent) = ctx.intent() {
            let action_id = intent.action_id.clone();
            return async move {
                let status = dispatch_intent(&ctx, &action_id).await;
                Ok(DispatchOutcome::Intent { action_id, status })
            }
            .boxed();
        }

        let mut inner = self.inner.clone();
        async move { inner.call(ctx).await }.boxed()
    }
}
