//! Expiring Cache Module
//!
//! The public handle: a mutex-guarded `CacheStore` plus the reclamation
//! task that sweeps it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore, SweepPolicy};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_reaper_task, ReaperHandle};

/// Locks the store, recovering the guard if a previous holder panicked.
///
/// Every critical section leaves the map consistent, so a poisoned lock
/// carries no torn state.
pub(crate) fn lock_store(store: &Mutex<CacheStore>) -> MutexGuard<'_, CacheStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Expiring Cache ==
/// Concurrency-safe memo of opaque payloads keyed by request identifier.
///
/// Entries are reclaimed by a background task running on the tokio runtime
/// the cache was built on. `add` and `get` are synchronous and never touch
/// the clock on the read path: an entry stays readable until a sweep
/// removes it, so it may be served for up to one sweep interval past its
/// TTL.
///
/// Share a single instance behind an `Arc`. Dropping the last handle stops
/// the reclamation task.
#[derive(Debug)]
pub struct ExpiringCache {
    /// Shared entry store, also weakly held by the reaper
    store: Arc<Mutex<CacheStore>>,
    /// Reclamation task control
    reaper: Mutex<ReaperHandle>,
    config: CacheConfig,
}

impl ExpiringCache {
    // == Constructor ==
    /// Creates a cache whose entries go stale after `ttl`, swept once per `ttl`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(ttl: Duration) -> Result<Self> {
        Self::with_config(CacheConfig::new(ttl))
    }

    /// Creates a cache from a full configuration on the current tokio runtime.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        // Validate first so a bad config never needs a runtime
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        Self::with_config_on(config, &runtime)
    }

    /// Creates a cache whose reclamation task runs on `runtime`.
    ///
    /// Usable from threads that are not themselves inside the runtime.
    pub fn with_config_on(config: CacheConfig, runtime: &Handle) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(Mutex::new(CacheStore::new()));
        let reaper = spawn_reaper_task(&store, config, runtime);

        debug!(
            ttl_ms = config.ttl.as_millis() as u64,
            sweep_interval_ms = config.sweep_interval.as_millis() as u64,
            policy = %config.policy,
            "Expiring cache created"
        );

        Ok(Self {
            store,
            reaper: Mutex::new(reaper),
            config,
        })
    }

    // == Add ==
    /// Stores `payload` under `key`, replacing any previous entry.
    ///
    /// The entry's age starts counting from this call.
    pub fn add(&self, key: impl Into<String>, payload: impl Into<Arc<[u8]>>) {
        let key = key.into();
        let payload = payload.into();
        lock_store(&self.store).add(key, payload);
    }

    // == Get ==
    /// Returns the payload stored under `key`, or `None` if absent.
    ///
    /// The returned bytes are an immutable shared view.
    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        lock_store(&self.store).get(key)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        lock_store(&self.store).len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        lock_store(&self.store).is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        lock_store(&self.store).stats()
    }

    // == Accessors ==
    /// Returns the age past which an entry becomes stale.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Returns the period between reclamation passes.
    pub fn sweep_interval(&self) -> Duration {
        self.config.sweep_interval
    }

    /// Returns the policy reclamation passes apply.
    pub fn policy(&self) -> SweepPolicy {
        self.config.policy
    }

    // == Lifecycle ==
    /// Signals the reclamation task to exit. Idempotent and non-blocking,
    /// so it is safe to call from teardown code.
    ///
    /// The cache stays usable afterwards, but nothing is reclaimed anymore.
    pub fn close(&self) {
        if self.lock_reaper().stop() {
            debug!("Expiring cache closed");
        }
    }

    /// Stops the reclamation task and waits for it to exit.
    pub async fn shutdown(self) {
        let mut reaper = self
            .reaper
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        reaper.shutdown().await;
    }

    /// Returns true while the reclamation task is alive.
    pub fn is_reaper_running(&self) -> bool {
        self.lock_reaper().is_running()
    }

    fn lock_reaper(&self) -> MutexGuard<'_, ReaperHandle> {
        self.reaper.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
