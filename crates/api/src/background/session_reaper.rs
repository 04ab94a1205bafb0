//! Periodic eviction of idle sessions.
//!
//! Runs [`SessionStore::reap_idle`] on a fixed `tokio::time::interval`. The
//! sweep interval is kept at or below the idle timeout (enforced by
//! [`ServerConfig`]), so a stale session outlives its threshold by at most
//! one interval. Sweeps never overlap: the loop awaits each one before the
//! next tick.

use std::sync::Arc;
use std::time::Duration;

use sessiond_core::store::SessionStore;
use sessiond_core::types::{SessionId, Timestamp};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Background task that evicts sessions idle for longer than the threshold.
pub struct SessionReaper {
    store: Arc<SessionStore>,
    idle_timeout: chrono::Duration,
    sweep_interval: Duration,
}

impl SessionReaper {
    pub fn new(store: Arc<SessionStore>, idle_timeout: Duration, sweep_interval: Duration) -> Self {
        Self {
            store,
            idle_timeout: chrono::Duration::from_std(idle_timeout)
                .unwrap_or(chrono::Duration::MAX),
            sweep_interval,
        }
    }

    pub fn from_config(store: Arc<SessionStore>, config: &ServerConfig) -> Self {
        Self::new(store, config.idle_timeout(), config.sweep_interval())
    }

    /// Evict stale sessions as of the store clock's current instant.
    pub fn sweep(&self) -> Vec<SessionId> {
        self.sweep_at(self.store.now())
    }

    /// Evict sessions idle for longer than the threshold as of `now`.
    pub fn sweep_at(&self, now: Timestamp) -> Vec<SessionId> {
        let evicted = self.store.reap_idle(self.idle_timeout, now);
        for id in &evicted {
            tracing::info!(session_id = %id, "Evicted idle session");
        }
        if evicted.is_empty() {
            tracing::debug!(active = self.store.len(), "Session sweep: nothing to evict");
        } else {
            tracing::info!(
                evicted = evicted.len(),
                active = self.store.len(),
                "Session sweep completed"
            );
        }
        evicted
    }

    /// Run the sweep loop until `cancel` is triggered.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            idle_timeout_secs = self.idle_timeout.num_seconds(),
            interval_secs = self.sweep_interval.as_secs(),
            "Session reaper started"
        );

        let mut interval = tokio::time::interval(self.sweep_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Session reaper stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.sweep();
                }
            }
        }
    }
}

/// Spawn `reaper` on the runtime. Cancel `cancel` to stop it.
pub fn spawn(reaper: SessionReaper, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(reaper.run(cancel))
}
