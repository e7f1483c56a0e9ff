//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.
//!
//! Instants come from the tokio clock so that tests can pause and advance time.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A cached value together with its absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// When the entry was written
    pub created_at: Instant,
    /// Instant from which the entry is stale
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after `now`.
    ///
    /// Callers must bound `ttl` so the addition cannot overflow; the store
    /// enforces `MAX_TTL_SECONDS` before getting here.
    pub fn new(value: T, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Returns remaining time to live, zero once expired.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

// == Is Expired ==
/// Checks whether `entry` is stale at `now`.
///
/// Boundary condition: an entry is expired once `now >= expires_at`, so a
/// zero TTL expires for every read that follows the write. Both the lazy read
/// path and the sweep go through this function.
pub fn is_expired<T>(entry: &CacheEntry<T>, now: Instant) -> bool {
    now >= entry.expires_at
}
