//! Eviction Sweeper Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! Lookups already refuse expired entries, so the sweeper only reclaims memory
//! held by entries nobody asks for again.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::SharedStore;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running sweeper.
///
/// Dropping the handle also stops the task, since the shutdown channel closes.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Eviction sweeper ended abnormally");
        }
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that purges expired entries every `sweep_interval`.
///
/// Each pass holds the store lock for one `purge_expired` call and nothing else.
/// The task keeps running through empty or fully fresh stores until it is shut
/// down through the returned handle.
///
/// # Example
/// ```ignore
/// let store = CacheStore::new(100, ttl).into_shared();
/// let sweeper = spawn_sweeper(store.clone(), ttl);
/// // Later, during shutdown:
/// sweeper.shutdown().await;
/// ```
pub fn spawn_sweeper(store: SharedStore, sweep_interval: Duration) -> SweeperHandle {
    let sweep_interval = sweep_interval.max(MIN_SWEEP_INTERVAL);
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!(
            interval_ms = sweep_interval.as_millis() as u64,
            "Eviction sweeper started"
        );

        let mut ticker = interval(sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let (removed, remaining) = {
                        let mut guard = store.lock().await;
                        (guard.purge_expired(), guard.len())
                    };

                    if removed > 0 {
                        info!(removed, remaining, "Sweeper purged expired entries");
                    } else {
                        debug!(remaining, "Sweeper found no expired entries");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Eviction sweeper shutting down");
                        break;
                    }
                }
            }
        }
    });

    SweeperHandle { shutdown_tx, task }
}
