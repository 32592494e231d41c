//! Eviction Policy Module
//!
//! Decides when an entry's rank is refreshed, which in turn decides which
//! entry sits at the front of the order tree and gets evicted next.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Eviction Policy ==
/// Ordering-key policy for the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently used: reads and writes move an entry to the back.
    #[default]
    Lru,
    /// Insertion order: an entry keeps the rank it got when first inserted.
    Fifo,
    /// Caller-supplied priority, lowest first; ties are broken by insertion order.
    Priority,
}

impl EvictionPolicy {
    /// Whether a successful `get` re-ranks the entry.
    pub fn refreshes_on_read(self) -> bool {
        matches!(self, Self::Lru)
    }

    /// Whether overwriting an existing key re-ranks the entry.
    ///
    /// `Priority` also re-ranks when the priority itself changes; that is
    /// decided by the store.
    pub fn refreshes_on_write(self) -> bool {
        matches!(self, Self::Lru)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Fifo => "fifo",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "fifo" => Ok(Self::Fifo),
            "priority" | "prio" => Ok(Self::Priority),
            other => Err(CacheError::InvalidConfiguration(format!(
                "unknown eviction policy '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_default_is_lru() {
        assert_eq!(EvictionPolicy::default(), EvictionPolicy::Lru);
    }

    #[test]
    fn test_policy_refresh_rules() {
        assert!(EvictionPolicy::Lru.refreshes_on_read());
        assert!(EvictionPolicy::Lru.refreshes_on_write());
        assert!(!EvictionPolicy::Fifo.refreshes_on_read());
        assert!(!EvictionPolicy::Fifo.refreshes_on_write());
        assert!(!EvictionPolicy::Priority.refreshes_on_read());
        assert!(!EvictionPolicy::Priority.refreshes_on_write());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("LRU".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Lru));
        assert_eq!(" fifo ".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Fifo));
        assert_eq!("prio".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Priority));
        assert!(matches!(
            "random".parse::<EvictionPolicy>(),
            Err(CacheError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_policy_display_roundtrips() {
        for policy in [
            EvictionPolicy::Lru,
            EvictionPolicy::Fifo,
            EvictionPolicy::Priority,
        ] {
            assert_eq!(policy.to_string().parse::<EvictionPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn test_policy_serde() {
        let json = serde_json::to_string(&EvictionPolicy::Priority).unwrap();
        assert_eq!(json, r#""priority""#);
        let policy: EvictionPolicy = serde_json::from_str(r#""fifo""#).unwrap();
        assert_eq!(policy, EvictionPolicy::Fifo);
    }
}
