//! AVL Cache - A fixed-capacity ordered cache
//!
//! Entries live in a self-balancing AVL tree; a second tree keyed by eviction
//! rank picks victims under LRU, FIFO or priority ordering.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;
pub mod tree;

pub use cache::{shared, AvlCache, CacheStats, EvictionPolicy, SharedCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_trim_task;
pub use tree::AvlTree;
