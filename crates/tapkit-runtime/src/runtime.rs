//! The inbound message loop.
//!
//! The messaging SDK (or a test) pushes `(message, conversation)` pairs into an
//! `mpsc` channel; [`AgentRuntime::run`] dispatches each on its own task.
//! Per-conversation state lives in the dispatcher's sessions, so messages from
//! different conversations interleave freely.
//!
//! ```rust,ignore
//! let config = ConfigLoader::new().load()?;
//! let runtime = AgentRuntime::from_config(dispatcher, config);
//! let (tx, rx) = runtime.channel();
//!
//! tokio::spawn(pump_sdk_stream(tx));
//! let stats = runtime.run(rx).await;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::TapkitConfig;
use crate::logging;
use tapkit_core::{BoxedConversation, InboundMessage};
use tapkit_framework::{ActionHandler, AppConfig, DispatchOutcome, Dispatcher, IntentStatus};

/// One inbound message and the conversation it arrived in.
pub type Incoming = (InboundMessage, BoxedConversation);

/// Default capacity of [`AgentRuntime::channel`].
const DEFAULT_BUFFER: usize = 256;

/// Counters of a runtime run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Messages taken off the channel.
    pub received: u64,
    /// Intents routed to the action registry.
    pub intents: u64,
    /// Intents whose handler failed, panicked or was missing.
    pub failed_intents: u64,
    /// Non-intent messages accepted by a matcher.
    pub matched: u64,
    /// Non-intent messages nothing accepted.
    pub unhandled: u64,
}

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    intents: AtomicU64,
    failed_intents: AtomicU64,
    matched: AtomicU64,
    unhandled: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Intent { status, .. } => {
                self.intents.fetch_add(1, Ordering::Relaxed);
                if *status != IntentStatus::Handled {
                    self.failed_intents.fetch_add(1, Ordering::Relaxed);
                }
            }
            DispatchOutcome::Matched => {
                self.matched.fetch_add(1, Ordering::Relaxed);
            }
            DispatchOutcome::Unhandled => {
                self.unhandled.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn snapshot(&self) -> RuntimeStats {
        RuntimeStats {
            received: self.received.load(Ordering::Relaxed),
            intents: self.intents.load(Ordering::Relaxed),
            failed_intents: self.failed_intents.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            unhandled: self.unhandled.load(Ordering::Relaxed),
        }
    }
}

/// Drives a [`Dispatcher`] from a channel of inbound messages.
#[derive(Debug)]
pub struct AgentRuntime {
    dispatcher: Dispatcher,
    config: Arc<TapkitConfig>,
    counters: Arc<Counters>,
    buffer: usize,
}

impl AgentRuntime {
    /// Creates a runtime with default configuration. Logging is left alone.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            config: Arc::new(TapkitConfig::default()),
            counters: Arc::new(Counters::default()),
            buffer: DEFAULT_BUFFER,
        }
    }

    /// Creates a runtime and installs logging from `config`.
    pub fn from_config(dispatcher: Dispatcher, config: TapkitConfig) -> Self {
        logging::init_from_config(&config.logging);
        Self {
            config: Arc::new(config),
            ..Self::new(dispatcher)
        }
    }

    /// Sets the capacity of channels created by [`channel`](Self::channel).
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &Arc<TapkitConfig> {
        &self.config
    }

    /// A channel sized for this runtime.
    pub fn channel(&self) -> (mpsc::Sender<Incoming>, mpsc::Receiver<Incoming>) {
        mpsc::channel(self.buffer)
    }

    pub fn stats(&self) -> RuntimeStats {
        self.counters.snapshot()
    }

    /// Installs the menus declared under `[app]` in the configuration.
    ///
    /// `handlers` are attached to the menu actions with matching ids; ids not
    /// found in any menu are registered as standalone actions. Returns `None`
    /// when the configuration declares no app.
    pub fn install_configured_app(
        &self,
        handlers: impl IntoIterator<Item = (String, ActionHandler)>,
    ) -> Option<Arc<AppConfig>> {
        let mut app = self.config.app.clone()?;

        let mut deferred = Vec::new();
        for (action_id, handler) in handlers {
            if app.attach_handler(&action_id, handler.clone()) == 0 {
                debug!(action_id = %action_id, "Handler has no menu action, registering standalone");
                deferred.push((action_id, handler));
            }
        }

        Some(self.dispatcher.install_app(app, deferred))
    }

    /// Dispatches messages until the channel closes or Ctrl+C / SIGTERM.
    pub async fn run(&self, rx: mpsc::Receiver<Incoming>) -> RuntimeStats {
        info!("Agent runtime is running. Press Ctrl+C to stop.");
        self.run_until(rx, wait_for_shutdown()).await
    }

    /// Dispatches messages until the channel closes or `shutdown` resolves.
    ///
    /// In-flight messages are finished before returning.
    pub async fn run_until<F>(&self, mut rx: mpsc::Receiver<Incoming>, shutdown: F) -> RuntimeStats
    where
        F: Future<Output = ()>,
    {
        info!(
            matchers = self.dispatcher.matcher_count(),
            actions = self.dispatcher.shared_registry().len(),
            network = %self.config.usdc.network_id,
            "Starting agent runtime"
        );

        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                incoming = rx.recv() => match incoming {
                    Some((message, conversation)) => self.spawn(&mut tasks, message, conversation),
                    None => {
                        info!("Inbound channel closed");
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_join(joined),
            }
        }

        if !tasks.is_empty() {
            debug!(in_flight = tasks.len(), "Waiting for in-flight messages");
        }
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        let stats = self.stats();
        info!(
            received = stats.received,
            intents = stats.intents,
            matched = stats.matched,
            unhandled = stats.unhandled,
            "Agent runtime stopped"
        );
        stats
    }

    fn spawn(
        &self,
        tasks: &mut JoinSet<()>,
        message: InboundMessage,
        conversation: BoxedConversation,
    ) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        debug!(message_id = %message.id, conversation = %conversation.id(), "Received message");

        let dispatcher = self.dispatcher.clone();
        let counters = Arc::clone(&self.counters);
        tasks.spawn(async move {
            let outcome = dispatcher.dispatch(message, conversation).await;
            counters.record(&outcome);
        });
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Message task failed");
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
///
/// If no handler can be installed this never resolves and only the channel
/// closing stops the runtime.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapkit_core::{Conversation, Intent, MemoryConversation};
    use tapkit_framework::{Menu, MenuAction, into_handler, on_text, reply_with};
    use tokio::sync::oneshot;

    fn ping_dispatcher() -> Dispatcher {
        let dispatcher = Dispatcher::new().with(
            on_text()
                .name("ping")
                .check(|ctx| ctx.text() == Some("ping"))
                .handler(|_ctx| async { "pong".to_string() }),
        );
        dispatcher.register_action("hello", reply_with("👋"));
        dispatcher
    }

    fn incoming(conv: &Arc<MemoryConversation>, content: impl Into<tapkit_core::Content>) -> Incoming {
        (
            InboundMessage::new(conv.id(), "sender", content),
            Arc::clone(conv) as BoxedConversation,
        )
    }

    #[tokio::test]
    async fn test_runs_until_channel_closes() {
        let runtime = AgentRuntime::new(ping_dispatcher());
        let (tx, rx) = runtime.channel();
        let conv = MemoryConversation::new("c1").boxed();

        tx.send(incoming(&conv, "ping")).await.unwrap();
        tx.send(incoming(&conv, "something else")).await.unwrap();
        tx.send(incoming(&conv, Intent::new("hello"))).await.unwrap();
        tx.send(incoming(&conv, Intent::new("missing"))).await.unwrap();
        drop(tx);

        let stats = runtime.run_until(rx, std::future::pending()).await;

        assert_eq!(
            stats,
            RuntimeStats {
                received: 4,
                intents: 2,
                failed_intents: 1,
                matched: 1,
                unhandled: 1,
            }
        );
        let mut texts = conv.texts();
        texts.sort();
        assert_eq!(texts, ["pong", "❌ Unknown action: missing", "👋"]);
    }

    #[tokio::test]
    async fn test_shutdown_wins_over_pending_messages() {
        let runtime = AgentRuntime::new(ping_dispatcher());
        let (tx, rx) = runtime.channel();
        let conv = MemoryConversation::new("c1").boxed();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        tx.send(incoming(&conv, "ping")).await.unwrap();
        stop_tx.send(()).unwrap();

        let stats = runtime
            .run_until(rx, async {
                let _ = stop_rx.await;
            })
            .await;

        assert_eq!(stats, RuntimeStats::default());
        assert!(conv.texts().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_conversations_are_dispatched_independently() {
        let runtime = AgentRuntime::new(ping_dispatcher());
        let (tx, rx) = runtime.channel();
        let convs: Vec<_> = (0..8)
            .map(|i| MemoryConversation::new(format!("c{i}")).boxed())
            .collect();

        for conv in &convs {
            tx.send(incoming(conv, "ping")).await.unwrap();
        }
        drop(tx);
        let stats = runtime.run(rx).await;

        assert_eq!(stats.received, 8);
        assert_eq!(stats.matched, 8);
        for conv in &convs {
            assert_eq!(conv.texts(), ["pong"]);
        }
        assert_eq!(runtime.dispatcher().sessions().len(), 8);
    }

    #[tokio::test]
    async fn test_install_configured_app() {
        let app = AppConfig::new("Demo").menu(
            Menu::new("main-menu", "Main")
                .action(MenuAction::new("balance", "💰 Balance"))
                .action(MenuAction::new("help", "Help")),
        );
        let config = TapkitConfig {
            app: Some(app),
            ..TapkitConfig::default()
        };
        let runtime = AgentRuntime {
            config: Arc::new(config),
            ..AgentRuntime::new(Dispatcher::new())
        };

        let installed = runtime
            .install_configured_app([
                ("balance".to_string(), reply_with("0 USDC")),
                (
                    "standalone".to_string(),
                    into_handler(|_ctx| async { "alone".to_string() }),
                ),
            ])
            .unwrap();
        assert_eq!(installed.name, "Demo");

        let registry = runtime.dispatcher().shared_registry();
        assert!(registry.contains("balance"));
        assert!(registry.contains("standalone"));
        assert!(registry.contains("main-menu"));

        let (tx, rx) = runtime.channel();
        let conv = MemoryConversation::new("c1").boxed();
        tx.send(incoming(&conv, Intent::new("balance"))).await.unwrap();
        drop(tx);
        runtime.run_until(rx, std::future::pending()).await;
        assert_eq!(conv.texts(), ["0 USDC"]);
    }

    #[test]
    fn test_no_configured_app() {
        let runtime = AgentRuntime::new(Dispatcher::new());
        assert!(runtime.install_configured_app(Vec::new()).is_none());
    }
}
