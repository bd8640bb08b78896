//! Handler system for tapkit.
//!
//! Every action handler and matcher handler is stored as an [`ActionHandler`]:
//! a type-erased async function of the [`MessageContext`]. Any async closure
//! returning a [`HandlerResponse`] converts into one with [`into_handler`].
//!
//! ```rust,ignore
//! use tapkit_framework::into_handler;
//!
//! // Returning a String sends it back as text
//! let greet = into_handler(|_ctx| async { "gm!".to_string() });
//!
//! // Returning Err reports a fault to the dispatcher
//! let balance = into_handler(|ctx| async move {
//!     ctx.send_text("checking...").await?;
//!     Ok::<_, FrameworkError>(())
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::context::MessageContext;
use crate::error::BoxError;
use tapkit_core::{ActionSet, Content};

// ============================================================================
// HandlerResponse
// ============================================================================

/// A trait for types that can be returned from handlers.
///
/// The response is turned into outbound messages. A failure while doing so, or
/// an `Err` returned by the handler, surfaces as the handler's fault.
#[async_trait]
pub trait HandlerResponse: Send + 'static {
    /// Performs the side effects of this response.
    async fn respond(self, ctx: &MessageContext) -> Result<(), BoxError>;
}

/// `()` - nothing to send.
#[async_trait]
impl HandlerResponse for () {
    async fn respond(self, _ctx: &MessageContext) -> Result<(), BoxError> {
        Ok(())
    }
}

/// `String` - sent as a text message.
#[async_trait]
impl HandlerResponse for String {
    async fn respond(self, ctx: &MessageContext) -> Result<(), BoxError> {
        ctx.send_text(&self).await?;
        Ok(())
    }
}

/// `ActionSet` - sent as a menu and remembered as the last sent actions.
#[async_trait]
impl HandlerResponse for ActionSet {
    async fn respond(self, ctx: &MessageContext) -> Result<(), BoxError> {
        crate::builder::send_actions(ctx, self).await?;
        Ok(())
    }
}

/// `Content` - sent as-is.
#[async_trait]
impl HandlerResponse for Content {
    async fn respond(self, ctx: &MessageContext) -> Result<(), BoxError> {
        ctx.send(self).await?;
        Ok(())
    }
}

/// On `Some` the inner response is handled, on `None` nothing happens.
#[async_trait]
impl<T: HandlerResponse> HandlerResponse for Option<T> {
    async fn respond(self, ctx: &MessageContext) -> Result<(), BoxError> {
        match self {
            Some(t) => t.respond(ctx).await,
            None => Ok(()),
        }
    }
}

/// On `Ok` the inner response is handled, `Err` becomes the handler fault.
#[async_trait]
impl<T, E> HandlerResponse for Result<T, E>
where
    T: HandlerResponse,
    E: Into<BoxError> + Send + 'static,
{
    async fn respond(self, ctx: &MessageContext) -> Result<(), BoxError> {
        match self {
            Ok(t) => t.respond(ctx).await,
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// ActionHandler
// ============================================================================

/// The future returned by an [`ActionHandler`].
pub type HandlerFuture = BoxFuture<'static, Result<(), BoxError>>;

/// A type-erased handler that can be stored in registries and matchers.
pub type ActionHandler = Arc<dyn Fn(Arc<MessageContext>) -> HandlerFuture + Send + Sync>;

/// Converts an async function of the context into an [`ActionHandler`].
pub fn into_handler<F, Fut, R>(f: F) -> ActionHandler
where
    F: Fn(Arc<MessageContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerResponse,
{
    Arc::new(move |ctx: Arc<MessageContext>| {
        let fut = f(Arc::clone(&ctx));
        async move { fut.await.respond(&ctx).await }.boxed()
    })
}

/// A handler that sends a fixed text.
pub fn reply_with(text: impl Into<String>) -> ActionHandler {
    let text: Arc<str> = Arc::from(text.into());
    into_handler(move |_ctx| {
        let text = Arc::clone(&text);
        async move { text.to_string() }
    })
}
