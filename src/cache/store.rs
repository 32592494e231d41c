//! Cache Store Module
//!
//! Capacity-bounded cache built from two AVL trees: `entries` maps each key to
//! its value and rank, `order` maps each rank back to its key. The first entry
//! of `order` is always the next eviction victim.

use std::borrow::Borrow;
use std::fmt;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EvictionPolicy, Rank};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tree::AvlTree;

/// Callback invoked with every entry the policy evicts.
pub type EvictionListener<K, V> = Box<dyn FnMut(&K, &V) + Send>;

// == AVL Cache ==
/// Fixed-capacity ordered cache.
///
/// After every public operation returns, `len() <= capacity()` and, when a
/// weight budget is set, `total_weight() <= max_weight()`.
pub struct AvlCache<K, V> {
    /// Key -> value and eviction metadata
    entries: AvlTree<K, CacheEntry<V>>,
    /// Rank -> key, smallest rank evicted first
    order: AvlTree<Rank, K>,
    policy: EvictionPolicy,
    capacity: usize,
    max_weight: Option<usize>,
    total_weight: usize,
    weigher: fn(&V) -> usize,
    /// Source of unique `Rank::seq` values
    tick: u64,
    stats: CacheStats,
    listener: Option<EvictionListener<K, V>>,
}

fn unit_weight<V>(_: &V) -> usize {
    1
}

impl<K: Ord + Clone, V> AvlCache<K, V> {
    // == Constructors ==
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// Fails with `InvalidConfiguration` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_policy(capacity, EvictionPolicy::Lru)
    }

    /// Creates a cache with an explicit eviction policy.
    pub fn with_policy(capacity: usize, policy: EvictionPolicy) -> Result<Self> {
        Self::from_config(&Config {
            max_entries: capacity,
            eviction_policy: policy,
            ..Config::default()
        })
    }

    /// Creates a cache from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: AvlTree::new(),
            order: AvlTree::new(),
            policy: config.eviction_policy,
            capacity: config.max_entries,
            max_weight: config.max_weight,
            total_weight: 0,
            weigher: unit_weight::<V>,
            tick: 0,
            stats: CacheStats::new(),
            listener: None,
        })
    }

    /// Replaces the weigher (default: every entry weighs 1).
    ///
    /// Intended for a fresh cache; entries already stored keep the weight
    /// they were charged on insertion.
    pub fn with_weigher(mut self, weigher: fn(&V) -> usize) -> Self {
        self.weigher = weigher;
        self
    }

    /// Registers a callback that sees every evicted entry before it is dropped.
    pub fn set_eviction_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&K, &V) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    // == Get ==
    /// Returns the value stored under `key`.
    ///
    /// Under `Lru` a hit re-ranks the entry to the back of eviction order.
    /// A miss changes nothing but the miss counter.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(rank) = self.entries.get(key).map(|entry| entry.rank) else {
            self.stats.record_miss();
            return None;
        };
        self.stats.record_hit();

        if self.policy.refreshes_on_read() {
            let fresh = self.rerank(rank, rank.priority);
            if let Some(entry) = self.entries.get_mut(key) {
                entry.rank = fresh;
            }
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Reads a value without re-ranking it or touching the statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Current priority of `key`.
    pub fn priority_of<Q>(&self, key: &Q) -> Option<i64>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.rank.priority)
    }

    // == Put ==
    /// Stores `key` -> `value`, returning the replaced value if the key existed.
    ///
    /// A new entry gets priority 0; an existing one keeps its priority. Victims
    /// are evicted afterwards until both limits hold again.
    ///
    /// Fails with `EntryTooLarge` or `WeightOverflow` before touching the cache.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.store(key, value, None)
    }

    /// Stores `key` -> `value` with an explicit eviction priority
    /// (lower priorities are evicted first under `EvictionPolicy::Priority`).
    pub fn put_with_priority(&mut self, key: K, value: V, priority: i64) -> Result<Option<V>> {
        self.store(key, value, Some(priority))
    }

    fn store(&mut self, key: K, value: V, priority: Option<i64>) -> Result<Option<V>> {
        let weight = (self.weigher)(&value);
        if let Some(max_weight) = self.max_weight {
            if weight > max_weight {
                return Err(CacheError::EntryTooLarge { weight, max_weight });
            }
        }

        let existing = self.entries.get(&key).map(|entry| (entry.rank, entry.weight));
        // Weight of the entry being replaced is released before the new one is charged.
        let released = existing.map_or(0, |(_, old_weight)| old_weight);
        let total_weight = (self.total_weight - released)
            .checked_add(weight)
            .ok_or(CacheError::WeightOverflow {
                weight,
                total_weight: self.total_weight - released,
            })?;

        let previous = match existing.map(|(rank, _)| rank) {
            Some(rank) => {
                let priority = priority.unwrap_or(rank.priority);
                let fresh = if self.policy.refreshes_on_write() || priority != rank.priority {
                    self.rerank(rank, priority)
                } else {
                    rank
                };
                let Some(entry) = self.entries.get_mut(&key) else {
                    unreachable!("entry vanished during overwrite");
                };
                entry.rank = fresh;
                Some(entry.replace(value, weight))
            }
            None => {
                let rank = self.next_rank(priority.unwrap_or(0));
                self.order.insert(rank, key.clone());
                self.entries.insert(key, CacheEntry::new(value, rank, weight));
                None
            }
        };
        self.total_weight = total_weight;

        self.enforce_limits();
        Ok(previous)
    }

    // == Delete ==
    /// Removes `key` and returns its value; `None` when absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.rank);
        self.total_weight -= entry.weight;
        Some(entry.value)
    }

    /// Removes `key`, reporting whether anything was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove(key).is_some()
    }

    // == Eviction ==
    /// The entry that would be evicted next.
    pub fn peek_victim(&self) -> Option<(&K, &V)> {
        let (_, key) = self.order.first()?;
        self.entries.get(key).map(|entry| (key, &entry.value))
    }

    /// Evicts the current victim and returns it.
    pub fn evict(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let Some(entry) = self.entries.remove(&key) else {
            unreachable!("order tree references a missing entry");
        };

        self.total_weight -= entry.weight;
        self.stats.record_eviction(entry.weight);
        debug!(
            rank = ?entry.rank,
            weight = entry.weight,
            remaining = self.entries.len(),
            "Evicted cache entry"
        );
        if let Some(listener) = self.listener.as_mut() {
            listener(&key, &entry.value);
        }
        Some((key, entry.value))
    }

    /// Evicts victims until at least `amount` weight has been released or the
    /// cache is empty. Returns the weight actually released.
    pub fn trim(&mut self, amount: usize) -> usize {
        let mut freed = 0;
        while freed < amount {
            let before = self.total_weight;
            if self.evict().is_none() {
                break;
            }
            freed += before - self.total_weight;
        }
        freed
    }

    fn over_limits(&self) -> bool {
        self.entries.len() > self.capacity
            || self.max_weight.is_some_and(|max| self.total_weight > max)
    }

    fn enforce_limits(&mut self) {
        while self.over_limits() {
            if self.evict().is_none() {
                break;
            }
        }
    }

    // == Ranking ==
    fn next_rank(&mut self, priority: i64) -> Rank {
        self.tick += 1;
        Rank::new(priority, self.tick)
    }

    /// Moves the `order` entry at `old` to a fresh rank and returns it.
    fn rerank(&mut self, old: Rank, priority: i64) -> Rank {
        let fresh = self.next_rank(priority);
        let Some(key) = self.order.remove(&old) else {
            unreachable!("entry rank missing from order tree");
        };
        self.order.insert(fresh, key);
        fresh
    }

    // == Inspection ==
    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_weight(&self) -> Option<usize> {
        self.max_weight
    }

    pub fn total_weight(&self) -> usize {
        self.total_weight
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Returns a statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.entries.len(), self.total_weight);
        stats
    }

    /// Entries in eviction order, next victim first.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order
            .iter()
            .filter_map(|(_, key)| self.entries.get(key).map(|entry| (key, &entry.value)))
    }

    /// Entries in ascending key order.
    pub fn iter_by_key(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter().map(|(key, entry)| (key, &entry.value))
    }

    /// Removes every entry without counting evictions.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.total_weight = 0;
    }

    /// Verifies both trees and that they describe the same entries.
    pub fn check_invariants(&self) -> Result<()> {
        self.entries.check_invariants()?;
        self.order.check_invariants()?;
        if self.entries.len() != self.order.len() {
            return Err(CacheError::InvariantViolation(format!(
                "{} entries but {} ranks",
                self.entries.len(),
                self.order.len()
            )));
        }
        for (rank, key) in self.order.iter() {
            match self.entries.get(key) {
                Some(entry) if entry.rank == *rank => {}
                _ => {
                    return Err(CacheError::InvariantViolation(format!(
                        "rank {rank:?} points at a stale entry"
                    )))
                }
            }
        }
        let weight: usize = self.entries.iter().map(|(_, entry)| entry.weight).sum();
        if weight != self.total_weight {
            return Err(CacheError::InvariantViolation(format!(
                "tracked weight {} but entries weigh {weight}",
                self.total_weight
            )));
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for AvlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .field("total_weight", &self.total_weight)
            .field("max_weight", &self.max_weight)
            .finish_non_exhaustive()
    }
}
