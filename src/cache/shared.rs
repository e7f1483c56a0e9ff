//! Shared Cache Handle
//!
//! `Cache<T>` is the cloneable handle the rest of the service holds. It wraps
//! a `CacheStore` in a mutex that is never held across an `.await`, and adds
//! the read-through `get_or_set` protocol on top.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::store::{ttl_duration, validate_key, CacheStore};
use crate::cache::CacheStats;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// A value returned by `get_or_set`, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub value: T,
    /// `true` when no producer ran for this call
    pub from_cache: bool,
}

impl<T> Fetched<T> {
    fn hit(value: T) -> Self {
        Self {
            value,
            from_cache: true,
        }
    }

    fn miss(value: T) -> Self {
        Self {
            value,
            from_cache: false,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

type FlightSlot = Arc<tokio::sync::Mutex<()>>;

struct Inner<T> {
    store: Mutex<CacheStore<T>>,
    /// Per-key locks for producers currently running (single-flight mode)
    in_flight: Mutex<HashMap<String, FlightSlot>>,
    single_flight: bool,
}

// == Cache ==
/// Thread-safe TTL cache handle with read-through population.
///
/// Construct one at startup and clone it into every component that needs it;
/// clones share the same entries.
pub struct Cache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Cache<T> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(CacheStore::new(config.default_ttl)),
                in_flight: Mutex::new(HashMap::new()),
                single_flight: config.single_flight,
            }),
        }
    }

    /// Creates a cache without single-flight deduplication.
    pub fn with_default_ttl(default_ttl: u64) -> Self {
        Self::new(CacheConfig {
            default_ttl,
            single_flight: false,
        })
    }

    // Every critical section leaves the map consistent, so a poisoned lock
    // is still safe to use.
    fn store(&self) -> MutexGuard<'_, CacheStore<T>> {
        self.inner.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn default_ttl(&self) -> u64 {
        self.store().default_ttl()
    }

    pub fn is_single_flight(&self) -> bool {
        self.inner.single_flight
    }

    /// Stores `value` under `key` for `ttl` seconds (default TTL when `None`).
    pub fn set(&self, key: impl Into<String>, value: T, ttl: Option<u64>) -> Result<()> {
        self.store().set(key.into(), value, ttl, Instant::now())
    }

    /// Returns the fresh value for `key`, removing it first if it has expired.
    pub fn get(&self, key: &str) -> Option<T> {
        self.store().get(key, Instant::now())
    }

    /// Removes `key`; a missing key is a no-op.
    pub fn delete(&self, key: &str) -> bool {
        self.store().delete(key)
    }

    /// Removes every listed key under a single lock acquisition.
    pub fn delete_many<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut store = self.store();
        keys.into_iter()
            .filter(|key| store.delete(key.as_ref()))
            .count()
    }

    pub fn clear(&self) -> usize {
        self.store().clear()
    }

    /// Entry count, including expired entries the sweep has not reached yet.
    pub fn len(&self) -> usize {
        self.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
    }

    /// Removes all currently expired entries and returns how many went.
    pub fn sweep(&self) -> usize {
        self.store().sweep(Instant::now())
    }

    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.store().ttl_remaining(key, Instant::now())
    }

    pub fn stats(&self) -> CacheStats {
        self.store().stats()
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, or runs `producer`, caches its
    /// result for `ttl` seconds and returns it.
    ///
    /// Producer errors are returned as-is and nothing is cached, so the next
    /// call for the same key runs a producer again. Invalid keys or TTLs are
    /// rejected before the producer runs.
    ///
    /// Without single-flight, concurrent misses on one key each run their own
    /// producer and the last one to finish wins. With single-flight, callers
    /// queue behind the running producer and read its result from the store.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<u64>,
        producer: F,
    ) -> std::result::Result<Fetched<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<CacheError>,
    {
        validate_key(key)?;
        ttl_duration(ttl.unwrap_or_else(|| self.default_ttl()))?;

        if let Some(value) = self.get(key) {
            return Ok(Fetched::hit(value));
        }

        if !self.inner.single_flight {
            return self.produce(key, ttl, producer).await;
        }

        let flight = self.join_flight(key);
        let _turn = flight.slot.lock().await;

        // Whoever held the slot before us may have filled the entry
        if let Some(value) = self.recheck(key) {
            debug!(key = %key, "cache filled by concurrent producer");
            return Ok(Fetched::hit(value));
        }

        self.produce(key, ttl, producer).await
    }

    async fn produce<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<u64>,
        producer: F,
    ) -> std::result::Result<Fetched<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<CacheError>,
    {
        self.store().stats_mut().record_producer_run();

        match producer().await {
            Ok(value) => {
                self.set(key, value.clone(), ttl)?;
                Ok(Fetched::miss(value))
            }
            Err(err) => {
                self.store().stats_mut().record_producer_failure();
                warn!(key = %key, "producer failed, nothing cached");
                Err(err)
            }
        }
    }

    /// Fresh read that counts a hit but not a second miss.
    fn recheck(&self, key: &str) -> Option<T> {
        let mut store = self.store();
        let now = Instant::now();
        store.ttl_remaining(key, now)?;
        store.get(key, now)
    }

    fn join_flight(&self, key: &str) -> FlightGuard<'_, T> {
        let slot = {
            let mut in_flight = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(in_flight.entry(key.to_string()).or_default())
        };

        FlightGuard {
            inner: &self.inner,
            key: key.to_string(),
            slot,
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Membership in a key's in-flight queue. The last member to leave removes
/// the slot, including when its future is dropped mid-producer.
struct FlightGuard<'a, T> {
    inner: &'a Inner<T>,
    key: String,
    slot: FlightSlot,
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Slot strong counts only change while the map is locked
        let slot = std::mem::take(&mut self.slot);

        // One reference in the map, one held by us
        if Arc::strong_count(&slot) == 2 {
            in_flight.remove(&self.key);
        }
        drop(slot);
        drop(in_flight);
    }
}
