//! Expiry Sweep Task
//!
//! Opt-in background task that periodically purges stale entries from the
//! in-process store. Without it, stale entries are only reclaimed when read
//! or displaced by LRU eviction.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::LocalStore;

/// Spawns a background task that purges stale entries every `interval`.
///
/// Returns a JoinHandle that can be aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let local = Arc::new(LocalStore::new(1000, Duration::from_secs(3600)));
/// let sweep = spawn_cleanup_task(local.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task(local: Arc<LocalStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "starting expiry sweep");

        loop {
            tokio::time::sleep(interval).await;

            let removed = local.purge_expired().await;
            if removed > 0 {
                info!(removed, "expiry sweep purged stale entries");
            } else {
                debug!("expiry sweep found no stale entries");
            }
        }
    })
}
