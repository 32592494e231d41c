//! Cache Statistics Module
//!
//! Counters for hits, misses and evictions, plus occupancy figures.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that found their key
    pub hits: u64,
    /// Lookups that did not
    pub misses: u64,
    /// Entries removed by the eviction policy (explicit deletes excluded)
    pub evictions: u64,
    /// Weight released by evictions
    pub evicted_weight: u64,
    /// Current number of entries
    pub total_entries: usize,
    /// Current sum of entry weights
    pub total_weight: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any lookup.
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

    // == Record Eviction ==
    /// Counts one eviction that released `weight`.
    pub fn record_eviction(&mut self, weight: usize) {
        self.evictions += 1;
        self.evicted_weight += weight as u64;
    }

    // == Update Occupancy ==
    /// Updates the current entry count and total weight.
    pub fn set_occupancy(&mut self, entries: usize, weight: usize) {
        self.total_entries = entries;
        self.total_weight = weight;
    }
}
