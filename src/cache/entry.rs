//! Cache Entry Module
//!
//! Defines the stored entry and the ordering key that decides eviction order.

// == Rank ==
/// Position of an entry in eviction order; the smallest rank is evicted first.
///
/// `priority` compares first, then `seq`, a per-cache tick that is unique for
/// every rank handed out. Equal priorities therefore fall back to age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rank {
    pub priority: i64,
    pub seq: u64,
}

impl Rank {
    pub fn new(priority: i64, seq: u64) -> Self {
        Self { priority, seq }
    }
}

// == Cache Entry ==
/// Represents a single cache entry with its value and eviction metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Current position in eviction order
    pub rank: Rank,
    /// Cost charged against the weight budget
    pub weight: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, rank: Rank, weight: usize) -> Self {
        Self {
            value,
            rank,
            weight,
        }
    }

    // == Replace ==
    /// Swaps in a new value and weight, returning the old value.
    pub fn replace(&mut self, value: V, weight: usize) -> V {
        self.weight = weight;
        std::mem::replace(&mut self.value, value)
    }
}
