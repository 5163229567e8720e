//! Cache Entry Module
//!
//! Defines the structure for individual cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single cached payload and the instant it was stored.
///
/// The payload is shared immutably; handing out a clone of the `Arc`
/// never exposes the stored bytes to mutation.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    /// The stored payload, never inspected by the cache
    pub(crate) payload: Arc<[u8]>,
    /// Monotonic insertion instant
    pub(crate) created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    #[allow(dead_code)]
    pub fn new(payload: Arc<[u8]>) -> Self {
        Self::created_at(payload, Instant::now())
    }

    /// Creates a new entry stamped with an explicit instant.
    pub fn created_at(payload: Arc<[u8]>, created_at: Instant) -> Self {
        Self { payload, created_at }
    }

    // == Age ==
    /// Returns how long the entry has been resident as of `now`.
    ///
    /// Saturates to zero if `now` precedes the creation instant.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Stale ==
    /// Returns true once the entry's age strictly exceeds `ttl`.
    pub fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}
