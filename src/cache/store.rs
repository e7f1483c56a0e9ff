//! Cache Store Module
//!
//! Single-threaded TTL map. `Cache` wraps it in a lock for shared use; every
//! method here takes `now` explicitly so the expiry logic stays deterministic.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::entry::{is_expired, CacheEntry};
use crate::cache::{CacheStats, MAX_KEY_LENGTH, MAX_TTL_SECONDS};
use crate::error::{CacheError, Result};

/// Rejects keys the cache will not store.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// Converts a TTL in seconds into a duration, rejecting values that would
/// overflow the clock.
pub fn ttl_duration(ttl_seconds: u64) -> Result<Duration> {
    if ttl_seconds > MAX_TTL_SECONDS {
        return Err(CacheError::InvalidTtl(format!(
            "TTL of {}s exceeds maximum of {}s",
            ttl_seconds, MAX_TTL_SECONDS
        )));
    }
    Ok(Duration::from_secs(ttl_seconds))
}

// == Cache Store ==
/// Key-value storage with per-entry expiry.
#[derive(Debug)]
pub struct CacheStore<T> {
    entries: HashMap<String, CacheEntry<T>>,
    stats: CacheStats,
    /// Default TTL in seconds for entries without explicit TTL
    default_ttl: u64,
}

impl<T: Clone> CacheStore<T> {
    // == Constructor ==
    /// Creates an empty store. A default TTL above `MAX_TTL_SECONDS` is
    /// clamped so that `set(.., None, ..)` can always succeed.
    pub fn new(default_ttl: u64) -> Self {
        if default_ttl > MAX_TTL_SECONDS {
            warn!(
                default_ttl,
                max = MAX_TTL_SECONDS,
                "default TTL exceeds maximum, clamping"
            );
        }
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl: default_ttl.min(MAX_TTL_SECONDS),
        }
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and its expiry.
    ///
    /// # Arguments
    /// * `ttl` - TTL in seconds, `None` uses the default. Zero is allowed and
    ///   makes the entry invisible to every later read.
    pub fn set(&mut self, key: String, value: T, ttl: Option<u64>, now: Instant) -> Result<()> {
        validate_key(&key)?;
        let ttl_seconds = ttl.unwrap_or(self.default_ttl);
        let ttl = ttl_duration(ttl_seconds)?;

        self.entries.insert(key.clone(), CacheEntry::new(value, ttl, now));
        debug!(key = %key, ttl = ttl_seconds, "cache set");
        Ok(())
    }

    // == Get ==
    /// Returns a clone of the fresh value for `key`.
    ///
    /// An entry found past its expiry is removed and reported as absent.
    pub fn get(&mut self, key: &str, now: Instant) -> Option<T> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                debug!(key = %key, "cache miss");
                return None;
            }
            Some(entry) => is_expired(entry, now),
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expired();
            debug!(key = %key, "cache entry expired");
            return None;
        }

        self.stats.record_hit();
        debug!(key = %key, "cache hit");
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Remaining TTL of a fresh entry, without touching stats.
    pub fn ttl_remaining(&self, key: &str, now: Instant) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| !is_expired(entry, now))
            .map(|entry| entry.ttl_remaining(now))
    }

    // == Delete ==
    /// Removes `key` if present. Returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(key = %key, "cache delete");
        }
        removed
    }

    /// Removes every entry, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        debug!(removed = count, "cache cleared");
        count
    }

    // == Sweep ==
    /// Removes all entries expired at `now`, read or not.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !is_expired(entry, now));
        let removed = before - self.entries.len();

        self.stats.record_swept(removed);
        removed
    }

    pub(crate) fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    // == Stats ==
    /// Snapshot of the counters; `total_entries` is taken from the map here.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
