//! Cache Statistics Module
//!
//! Tracks per-group counters for hits, misses, evictions and load sources.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered by the local cache
    pub hits: u64,
    /// Lookups that missed the local cache
    pub misses: u64,
    /// Entries evicted by the byte budget
    pub evictions: u64,
    /// Calls into the local loader
    pub local_loads: u64,
    /// Values fetched from a remote peer
    pub peer_loads: u64,
    /// Remote fetches that failed and fell back to the loader
    pub peer_errors: u64,
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
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Evictions ==
    /// Adds `count` evictions.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Record Local Load ==
    /// Increments the local loader counter.
    pub fn record_local_load(&mut self) {
        self.local_loads += 1;
    }

    // == Record Peer Load ==
    /// Increments the peer fetch counter.
    pub fn record_peer_load(&mut self) {
        self.peer_loads += 1;
    }

    // == Record Peer Error ==
    /// Increments the failed peer fetch counter.
    pub fn record_peer_error(&mut self) {
        self.peer_errors += 1;
    }

    // == Set Total Entries ==
    /// Sets the current entry count.
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
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
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
    fn test_record_evictions() {
        let mut stats = CacheStats::new();
        stats.record_evictions(2);
        stats.record_evictions(0);
        stats.record_evictions(1);
        assert_eq!(stats.evictions, 3);
    }

    #[test]
    fn test_load_sources() {
        let mut stats = CacheStats::new();
        stats.record_local_load();
        stats.record_peer_error();
        stats.record_peer_load();
        assert_eq!(stats.local_loads, 1);
        assert_eq!(stats.peer_errors, 1);
        assert_eq!(stats.peer_loads, 1);
    }
}
