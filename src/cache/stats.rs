//! Cache Statistics Module
//!
//! Tracks hits, misses, expirations and producer activity.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing cache behavior since startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a fresh value
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed lazily because they were read past expiry
    pub expired: u64,
    /// Entries removed by the background sweep
    pub swept: u64,
    /// Producer invocations started by `get_or_set`
    pub producer_runs: u64,
    /// Producer invocations that returned an error
    pub producer_failures: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing has been read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records a lazy expiry; the read also counts as a miss.
    pub fn record_expired(&mut self) {
        self.expired += 1;
        self.misses += 1;
    }

    pub fn record_swept(&mut self, count: usize) {
        self.swept += count as u64;
    }

    pub fn record_producer_run(&mut self) {
        self.producer_runs += 1;
    }

    pub fn record_producer_failure(&mut self) {
        self.producer_failures += 1;
    }

    // == Update Entry Count ==
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_expired_counts_as_miss() {
        let mut stats = CacheStats::new();
        stats.record_expired();
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_producer_counters() {
        let mut stats = CacheStats::new();
        stats.record_producer_run();
        stats.record_producer_run();
        stats.record_producer_failure();
        stats.record_swept(4);
        assert_eq!(stats.producer_runs, 2);
        assert_eq!(stats.producer_failures, 1);
        assert_eq!(stats.swept, 4);
    }
}
