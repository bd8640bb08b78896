//! # tapkit core
//!
//! The content model and conversation boundary shared by every tapkit crate.
//!
//! - [`content`]: wire payloads ([`Content`], [`ActionSet`], [`Intent`], ...)
//! - [`message`]: inbound messages and conversation members
//! - [`conversation`]: the [`Conversation`] trait standing in for the
//!   messaging SDK, plus the in-process [`MemoryConversation`]
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌────────────┐  Content  ┌──────────────┐
//! │ messaging SDK│─────────────────▶│ dispatcher │──────────▶│ Conversation │
//! └──────────────┘                  └────────────┘           └──────────────┘
//! ```

pub mod content;
pub mod conversation;
pub mod error;
pub mod message;

pub use content::{Action, ActionSet, ActionStyle, Content, Intent, WalletCall, WalletSendCalls};
pub use conversation::{BoxedConversation, Conversation, MemoryConversation, SentMessage};
pub use error::{ConversationError, ConversationResult};
pub use message::{AccountIdentifier, IdentifierKind, InboundMessage, Member};
