//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, including
//! ones that are never read again and so would escape lazy expiry.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that sweeps expired entries every
/// `sweep_interval_secs` seconds.
///
/// The task runs until its handle is aborted, which the service does during
/// shutdown. Each pass holds the cache lock only for one `retain` over the map.
///
/// # Example
/// ```ignore
/// let cache: Cache<serde_json::Value> = Cache::with_default_ttl(300);
/// let sweep_handle = spawn_sweep_task(cache.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<T>(cache: Cache<T>, sweep_interval_secs: u64) -> JoinHandle<()>
where
    T: Clone + Send + 'static,
{
    // A zero period would spin
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep();

            if removed > 0 {
                info!(removed, remaining = cache.len(), "cache sweep removed expired entries");
            } else {
                debug!("cache sweep: no expired entries found");
            }
        }
    })
}
