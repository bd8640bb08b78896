//! # tapkit resolver
//!
//! Turns the accounts people mention in chat into addresses.
//!
//! - [`mention`]: pull mentions (`@alice`, `vitalik.eth`, `0xabc1…f002`) out of text
//! - [`address`]: address shapes, shortened-address matching, member addresses
//! - [`resolve`]: the [`IdentifierResolver`] and the [`NameResolver`] seam
//! - [`web3bio`]: a [`NameResolver`] backed by the web3.bio profile API
//!
//! ```rust,ignore
//! let resolver = IdentifierResolver::new(Web3BioClient::new(api_key));
//! let members = conversation.members().await?;
//! let resolved = resolver
//!     .resolve_mentions_in_message("send 5 to @alice", Some(&members))
//!     .await;
//! ```

pub mod address;
pub mod error;
pub mod mention;
pub mod resolve;
pub mod web3bio;

pub use address::{
    extract_member_addresses, is_full_address, is_shortened_address, match_shortened_address,
};
pub use error::{ResolveError, ResolveResult};
pub use mention::extract_mentions;
pub use resolve::{BoxedNameResolver, IdentifierResolver, NameResolver};
pub use web3bio::{DEFAULT_BASE_URL, FarcasterProfile, Social, Web3BioClient, Web3BioProfile};
