//! # tapkit framework
//!
//! Inline actions for chat agents: send tappable menus, route the user's
//! choice back to a handler.
//!
//! This layer provides:
//! - [`ActionRegistry`] and the [`InlineActionsLayer`] tower middleware
//! - [`Dispatcher`] with per-conversation [`Session`]s
//! - Matcher system for ordinary messages (`on_text`, `on_command`, ...)
//! - Confirmation and selection prompts with collision-free ids
//! - Declarative menus ([`AppConfig`]) and navigation helpers
//! - Input validators

pub mod builder;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod ids;
pub mod matcher;
pub mod matcher_builders;
pub mod menu;
pub mod middleware;
pub mod prompt;
pub mod registry;
pub mod session;
pub mod validators;

pub use builder::{ActionBuilder, send_actions};
pub use context::MessageContext;
pub use dispatcher::Dispatcher;
pub use error::{BoxError, FrameworkError, FrameworkResult};
pub use handler::{ActionHandler, HandlerFuture, HandlerResponse, into_handler, reply_with};
pub use ids::ActionIds;
pub use matcher::{CheckFn, Matcher, MatcherChain};
pub use matcher_builders::{on_command, on_content, on_prefix, on_text};
pub use menu::{
    AppConfig, AppOptions, MAIN_MENU, Menu, MenuAction, NAVIGATION_OPTIONS, show_last_menu,
    show_menu, show_navigation_options,
};
pub use middleware::{
    DispatchOutcome, InlineActionsLayer, InlineActionsService, IntentStatus, dispatch_intent,
};
pub use prompt::{Confirmation, SelectionOption, send_confirmation, send_selection};
pub use registry::ActionRegistry;
pub use session::{LastMenu, Session, SessionStore};
pub use validators::{ValidationError, validate_ethereum_address, validate_inbox_id};
