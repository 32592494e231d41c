//! Cache Module
//!
//! Capacity-bounded cache on top of the AVL tree with pluggable eviction order.

mod entry;
mod policy;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::Mutex;

// Re-export public types
pub use entry::{CacheEntry, Rank};
pub use policy::EvictionPolicy;
pub use stats::CacheStats;
pub use store::{AvlCache, EvictionListener};

/// A cache behind the lock that serializes access from several tasks.
pub type SharedCache<K, V> = Arc<Mutex<AvlCache<K, V>>>;

/// Wraps a cache for shared use.
pub fn shared<K, V>(cache: AvlCache<K, V>) -> SharedCache<K, V> {
    Arc::new(Mutex::new(cache))
}
