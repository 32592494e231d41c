//! Error types for the cache
//!
//! Provides unified error handling using thiserror. A missing key is not an
//! error: lookups return `Option` and deletes return `bool`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Rejected configuration (zero capacity, zero weight budget, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A single entry is heavier than the whole weight budget
    #[error("Entry too large: weight {weight} exceeds budget of {max_weight}")]
    EntryTooLarge { weight: usize, max_weight: usize },

    /// Adding the entry would overflow the tracked total weight
    #[error("Weight overflow: adding {weight} to a total of {total_weight}")]
    WeightOverflow { weight: usize, total_weight: usize },

    /// Internal tree invariant broken
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
