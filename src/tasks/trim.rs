//! Weight Trim Task
//!
//! Background task that periodically evicts victims from a shared cache
//! until its total weight is back under a budget.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::config::Config;
use crate::error::Result;

/// Spawns a background task that keeps a shared cache under `weight_budget`.
///
/// Every `config.trim_interval` seconds the task locks the cache and, if the
/// total weight is above the budget, evicts victims in policy order until at
/// least the excess has been released. The lock is never held across a sleep.
///
/// # Errors
/// `CacheError::InvalidConfiguration` when `config` fails validation,
/// including a zero trim interval.
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop trimming.
///
/// # Example
/// ```ignore
/// let config = Config::from_env();
/// let cache = shared(AvlCache::from_config(&config)?.with_weigher(|v: &Vec<u8>| v.len()));
/// let trim_handle = spawn_trim_task(cache.clone(), 64 * 1024, &config)?;
/// // Later, during shutdown:
/// trim_handle.abort();
/// ```
pub fn spawn_trim_task<K, V>(
    cache: SharedCache<K, V>,
    weight_budget: usize,
    config: &Config,
) -> Result<JoinHandle<()>>
where
    K: Ord + Clone + Send + 'static,
    V: Send + 'static,
{
    config.validate()?;
    let interval_secs = config.trim_interval;
    let interval = Duration::from_secs(interval_secs);

    Ok(tokio::spawn(async move {
        info!(
            "Starting trim task with budget {} and interval of {} seconds",
            weight_budget, interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let (freed, remaining) = {
                let mut cache_guard = cache.lock().await;
                let excess = cache_guard.total_weight().saturating_sub(weight_budget);
                let freed = if excess > 0 {
                    cache_guard.trim(excess)
                } else {
                    0
                };
                (freed, cache_guard.total_weight())
            };

            if freed > 0 {
                info!("Trim: released {} weight, {} remaining", freed, remaining);
            } else {
                debug!("Trim: cache within budget ({} <= {})", remaining, weight_budget);
            }
        }
    }))
}
