//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;

use tracing::warn;

use crate::cache::EvictionPolicy;
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Optional budget for the sum of entry weights
    pub max_weight: Option<usize>,
    /// Which entry is evicted first
    pub eviction_policy: EvictionPolicy,
    /// Background trim task interval in seconds
    pub trim_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `MAX_WEIGHT` - Weight budget (default: unbounded)
    /// - `EVICTION_POLICY` - `lru`, `fifo` or `priority` (default: lru)
    /// - `TRIM_INTERVAL` - Trim frequency in seconds (default: 1)
    ///
    /// Unparsable values fall back to their defaults. Range checks happen in
    /// [`Config::validate`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            max_weight: parse_var("MAX_WEIGHT").or(defaults.max_weight),
            eviction_policy: parse_var("EVICTION_POLICY").unwrap_or(defaults.eviction_policy),
            trim_interval: parse_var("TRIM_INTERVAL").unwrap_or(defaults.trim_interval),
        }
    }

    /// Checks the limits; a cache is never built from a rejected config.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfiguration(
                "max_entries must be at least 1".to_string(),
            ));
        }
        if self.max_weight == Some(0) {
            return Err(CacheError::InvalidConfiguration(
                "max_weight must be at least 1".to_string(),
            ));
        }
        if self.trim_interval == 0 {
            return Err(CacheError::InvalidConfiguration(
                "trim_interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", name, raw, e);
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_weight: None,
            eviction_policy: EvictionPolicy::Lru,
            trim_interval: 1,
        }
    }
}
