//! Identifier resolution.
//!
//! [`IdentifierResolver`] turns a mention into an address:
//!
//! | identifier            | result                                         |
//! |-----------------------|------------------------------------------------|
//! | `0x` + 40 hex         | returned as is, no lookup                      |
//! | `0xabc1…f002`         | matched against the conversation's members     |
//! | `alice`               | looked up as `alice.farcaster.eth`             |
//! | `alice.base.eth`      | looked up as is                                |
//!
//! Lookups go through a [`NameResolver`]. A failed lookup is logged and
//! reported as unresolved (`None`).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::address::{
    extract_member_addresses, is_full_address, is_shortened_address, match_shortened_address,
};
use crate::error::ResolveResult;
use crate::mention::extract_mentions;
use tapkit_core::Member;

/// Looks up the address behind a name such as `vitalik.eth`.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Returns `Ok(None)` when the name is unknown.
    async fn resolve(&self, name: &str) -> ResolveResult<Option<String>>;
}

/// A type-erased name resolver.
pub type BoxedNameResolver = Arc<dyn NameResolver>;

#[derive(Clone)]
pub struct IdentifierResolver {
    names: BoxedNameResolver,
}

impl IdentifierResolver {
    pub fn new(names: impl NameResolver + 'static) -> Self {
        Self {
            names: Arc::new(names),
        }
    }

    pub fn from_boxed(names: BoxedNameResolver) -> Self {
        Self { names }
    }

    /// Resolves a single identifier.
    ///
    /// `member_addresses` is only consulted for shortened addresses; without
    /// it a shortened address stays unresolved.
    pub async fn resolve_identifier(
        &self,
        identifier: &str,
        member_addresses: Option<&[String]>,
    ) -> Option<String> {
        if is_full_address(identifier) {
            return Some(identifier.to_string());
        }

        if is_shortened_address(identifier) {
            return match member_addresses {
                Some(addresses) if !addresses.is_empty() => {
                    match_shortened_address(identifier, addresses)
                }
                _ => None,
            };
        }

        let name = if identifier.contains('.') {
            identifier.to_string()
        } else {
            format!("{identifier}.farcaster.eth")
        };

        debug!(name = %name, "Resolving name");
        match self.names.resolve(&name).await {
            Ok(address) => address,
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to resolve");
                None
            }
        }
    }

    /// Resolves every mention found in `message`, concurrently.
    ///
    /// The map holds an entry per mention, `None` where resolution failed.
    pub async fn resolve_mentions_in_message(
        &self,
        message: &str,
        members: Option<&[Member]>,
    ) -> BTreeMap<String, Option<String>> {
        let mentions = extract_mentions(message);
        if mentions.is_empty() {
            return BTreeMap::new();
        }

        let addresses = members.map(extract_member_addresses).unwrap_or_default();
        let lookups = mentions.iter().map(|mention| async {
            let address = self
                .resolve_identifier(mention, Some(addresses.as_slice()))
                .await;
            (mention.clone(), address)
        });

        join_all(lookups).await.into_iter().collect()
    }
}

impl std::fmt::Debug for IdentifierResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierResolver").finish_non_exhaustive()
    }
}
