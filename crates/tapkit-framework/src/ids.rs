//! Unique ids for ephemeral actions.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonic id source shared by every context of one dispatcher.
///
/// Ids never repeat for the lifetime of the dispatcher, no matter how many
/// prompts are created within the same clock tick.
#[derive(Debug, Clone, Default)]
pub struct ActionIds {
    last: Arc<AtomicU64>,
}

impl ActionIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sequence number, starting at 1.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns `"<prefix>-<n>"` for a fresh sequence number.
    pub fn with_prefix(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next())
    }
}
