//! # tapkit
//!
//! A toolkit for chat agents that send tappable menus into a conversation and
//! route the user's choice back to a handler.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  (message, conversation)  ┌──────────────┐     ┌──────────────────────────┐
//! │ messaging SDK│──────────────────────────▶│ AgentRuntime │────▶│ Dispatcher               │
//! └──────────────┘         mpsc              │ (task / msg) │     │  InlineActionsLayer      │──▶ action registry
//!                                            └──────────────┘     │  MatcherChain            │──▶ text handlers
//!                                                                 └──────────────────────────┘
//! ```
//!
//! - **core**: content types (`ActionSet`, `Intent`, ...) and the `Conversation` trait
//! - **framework**: action registry, dispatch middleware, confirmations, menus, validators
//! - **resolver**: mention extraction and identifier-to-address resolution via web3.bio
//! - **usdc**: USDC transfer calls and balance queries on Base
//! - **runtime**: configuration, logging and the inbound message loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tapkit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = AppConfig::new("Wallet").menu(
//!         Menu::new(MAIN_MENU, "What would you like to do?")
//!             .action(MenuAction::new("balance", "💰 Balance").handler(reply_with("12.5 USDC"))),
//!     );
//!
//!     let dispatcher = Dispatcher::new();
//!     let app = dispatcher.install_app(app, []);
//!     let dispatcher = dispatcher.with(on_command("/menu").handler(move |ctx| {
//!         let app = app.clone();
//!         async move { show_menu(&ctx, &app, MAIN_MENU).await }
//!     }));
//!
//!     let runtime = AgentRuntime::from_config(dispatcher, ConfigLoader::new().load()?);
//!     let (tx, rx) = runtime.channel();
//!     // feed `tx` from the messaging SDK
//!     runtime.run(rx).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `tapkit.toml` configuration files
//! - `yaml-config`: `tapkit.yaml` configuration files
//! - `json-log`: JSON log lines

pub use tapkit_core as core;
pub use tapkit_framework as framework;
pub use tapkit_resolver as resolver;
pub use tapkit_runtime as runtime;
pub use tapkit_usdc as usdc;

/// Commonly used types for building agents.
///
/// ```rust,ignore
/// use tapkit::prelude::*;
/// ```
pub mod prelude {
    // Runtime
    pub use tapkit_runtime::{
        AgentRuntime, AgentServices, ConfigLoader, Incoming, RuntimeStats, TapkitConfig,
    };

    // Content and conversations
    pub use tapkit_core::{
        Action, ActionSet, ActionStyle, BoxedConversation, Content, Conversation, InboundMessage,
        Intent, Member, MemoryConversation, WalletSendCalls,
    };

    // Dispatch
    pub use tapkit_framework::{
        ActionBuilder, ActionHandler, DispatchOutcome, Dispatcher, FrameworkError,
        FrameworkResult, Matcher, MessageContext, into_handler, on_command, on_content,
        on_prefix, on_text, reply_with,
    };

    // Prompts and menus
    pub use tapkit_framework::{
        AppConfig, MAIN_MENU, Menu, MenuAction, SelectionOption, send_actions, send_confirmation,
        send_selection, show_last_menu, show_menu, show_navigation_options,
    };

    // Validation and resolution
    pub use tapkit_framework::{validate_ethereum_address, validate_inbox_id};
    pub use tapkit_resolver::{IdentifierResolver, Web3BioClient, extract_mentions};
    pub use tapkit_usdc::{UsdcHandler, format_units, to_base_units};

    // Logging macros
    pub use tapkit_runtime::prelude::*;
}
