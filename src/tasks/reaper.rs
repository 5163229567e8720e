//! Reclamation Task
//!
//! Background task that periodically sweeps stale entries out of the store.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{lock_store, CacheStore};
use crate::config::CacheConfig;

/// Longest wait between two sweeps. Longer sweep intervals, up to
/// `Duration::MAX`, are clamped so the tick deadline stays representable.
pub(crate) const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Reaper Handle ==
/// Owns the shutdown signal and join handle of a running reclamation task.
#[derive(Debug)]
pub(crate) struct ReaperHandle {
    /// Shutdown signal sender, taken on the first stop
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Task handle, taken when awaited
    task: Option<JoinHandle<()>>,
}

impl ReaperHandle {
    /// Signals the task to exit without waiting for it.
    ///
    /// Returns false if the signal had already been sent.
    pub fn stop(&mut self) -> bool {
        match self.shutdown_tx.take() {
            Some(tx) => {
                // The task may already be gone if the store was dropped.
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    /// Returns true while the task has not yet exited.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signals the task to exit and waits until it has.
    pub async fn shutdown(&mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns a task on `runtime` that sweeps `store` once per sweep interval.
///
/// The first sweep happens one full interval after this call; missed ticks
/// are delayed rather than replayed in a burst. The task holds only a weak
/// reference to the store and exits once the store is dropped, the
/// returned handle is stopped, or the handle itself is dropped.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(CacheStore::new()));
/// let mut reaper = spawn_reaper_task(&store, CacheConfig::default(), &Handle::current());
/// // Later, during teardown:
/// reaper.shutdown().await;
/// ```
pub(crate) fn spawn_reaper_task(
    store: &Arc<Mutex<CacheStore>>,
    config: CacheConfig,
    runtime: &Handle,
) -> ReaperHandle {
    let store: Weak<Mutex<CacheStore>> = Arc::downgrade(store);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    // Anchor the first tick at spawn time rather than first poll
    let mut ticker = {
        let _guard = runtime.enter();
        let period = config.sweep_interval.min(MAX_SWEEP_PERIOD);
        let now = Instant::now();
        let start = now.checked_add(period).unwrap_or(now);
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    };

    let task = runtime.spawn(async move {
        info!(
            ttl_ms = config.ttl.as_millis() as u64,
            sweep_interval_ms = config.sweep_interval.as_millis() as u64,
            policy = %config.policy,
            "Starting cache reclamation task"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown_rx => {
                    info!("Cache reclamation task received shutdown signal");
                    break;
                }
            }

            let Some(live) = store.upgrade() else {
                debug!("Cache dropped, reclamation task exiting");
                break;
            };

            let (removed, remaining) = {
                let mut guard = lock_store(&live);
                let removed = guard.sweep(Instant::now(), config.ttl, config.policy);
                (removed, guard.len())
            };

            if removed > 0 {
                info!("Cache sweep: removed {} entries, {} remaining", removed, remaining);
            } else {
                debug!("Cache sweep: nothing to reclaim");
            }
        }

        info!("Cache reclamation task stopped");
    });

    ReaperHandle {
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cache::SweepPolicy;

    fn config(ttl_ms: u64, sweep_ms: u64) -> CacheConfig {
        CacheConfig::new(Duration::from_millis(ttl_ms))
            .with_sweep_interval(Duration::from_millis(sweep_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_removes_stale_entries() {
        let store = Arc::new(Mutex::new(CacheStore::new()));
        lock_store(&store).add("expire_soon", vec![1]);

        let mut reaper = spawn_reaper_task(&store, config(100, 50), &Handle::current());

        // Sweeps at 50 and 100 keep the entry, the sweep at 150 removes it
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(lock_store(&store).contains_key("expire_soon"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(
            !lock_store(&store).contains_key("expire_soon"),
            "Stale entry should have been reclaimed"
        );

        reaper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_preserves_fresh_entries() {
        let store = Arc::new(Mutex::new(CacheStore::new()));
        lock_store(&store).add("long_lived", vec![1]);

        let mut reaper = spawn_reaper_task(&store, config(3_600_000, 100), &Handle::current());

        tokio::time::sleep(Duration::from_millis(550)).await;

        let stats = lock_store(&store).stats();
        assert_eq!(stats.sweeps, 5);
        assert_eq!(stats.reclaimed, 0);
        assert!(lock_store(&store).contains_key("long_lived"));

        reaper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_clear_all_policy() {
        let store = Arc::new(Mutex::new(CacheStore::new()));
        let cfg = config(3_600_000, 100).with_policy(SweepPolicy::ClearAll);
        let mut reaper = spawn_reaper_task(&store, cfg, &Handle::current());

        tokio::time::sleep(Duration::from_millis(90)).await;
        lock_store(&store).add("just_added", vec![1]);

        // Despite the one hour TTL, the tick at 100 clears everything
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(lock_store(&store).is_empty());

        reaper.shutdown().await;
    }

    #[tokio::test]
    async fn test_reaper_can_be_stopped() {
        let store = Arc::new(Mutex::new(CacheStore::new()));
        let mut reaper = spawn_reaper_task(&store, config(1000, 1000), &Handle::current());

        assert!(reaper.is_running());
        assert!(reaper.stop());
        assert!(!reaper.stop(), "Second stop should be a no-op");

        reaper.shutdown().await;
        assert!(!reaper.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_accepts_unbounded_sweep_interval() {
        let store = Arc::new(Mutex::new(CacheStore::new()));
        lock_store(&store).add("forever", vec![1]);

        let cfg = CacheConfig::new(Duration::MAX);
        let mut reaper = spawn_reaper_task(&store, cfg, &Handle::current());

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(reaper.is_running());
        assert!(lock_store(&store).contains_key("forever"));
        assert_eq!(lock_store(&store).stats().sweeps, 0);

        reaper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_exits_when_store_dropped() {
        let store = Arc::new(Mutex::new(CacheStore::new()));
        let reaper = spawn_reaper_task(&store, config(100, 100), &Handle::current());

        drop(store);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!reaper.is_running(), "Task should exit once the store is gone");
    }
}
