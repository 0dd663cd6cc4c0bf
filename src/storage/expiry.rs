//! Background Sweep Scheduler
//!
//! Reads never look at an entry's age, so stale entries only disappear when a
//! sweep runs. This module runs one on a fixed cadence for as long as the
//! process lives.
//!
//! ## Design
//!
//! The scheduler runs as a Tokio task and loops through two states:
//!
//! ```text
//!   Idle ──(interval elapses)──> Sweeping ──(sweep completes)──> Idle
//! ```
//!
//! There is no jitter and no backoff. A sweep cannot fail, so there is nothing
//! to retry; each pass is logged and the loop carries on. The loop ends only
//! when its [`SweepScheduler`] handle is stopped or dropped.

use crate::storage::{Clock, RelayStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Default time between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Configuration for the sweep scheduler.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Fixed idle time between the end of one sweep and the start of the next
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// A handle to the running sweep task.
///
/// When this handle is dropped, the sweep task will be stopped.
#[derive(Debug)]
pub struct SweepScheduler {
    shutdown_tx: watch::Sender<bool>,
}

impl SweepScheduler {
    /// Starts the sweep loop as a background task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use progress_relay::storage::{RelayStore, StoreConfig, SweepConfig, SweepScheduler, SystemClock};
    /// use std::sync::Arc;
    ///
    /// let store = Arc::new(RelayStore::new(StoreConfig::new("s3cret")));
    /// let scheduler = SweepScheduler::start(store, Arc::new(SystemClock), SweepConfig::default());
    ///
    /// // Sweeps run in the background...
    ///
    /// // Dropping the handle stops them
    /// drop(scheduler);
    /// ```
    pub fn start(store: Arc<RelayStore>, clock: Arc<dyn Clock>, config: SweepConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            interval_secs = config.interval.as_secs(),
            max_age_secs = store.max_age(),
            "Sweep scheduler started"
        );

        tokio::spawn(sweep_loop(store, clock, config, shutdown_rx));

        Self { shutdown_tx }
    }

    /// Stops the sweep task.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        if self.shutdown_tx.send_replace(true) {
            return;
        }
        info!("Sweep scheduler stopped");
    }
}

impl Drop for SweepScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweep_loop(
    store: Arc<RelayStore>,
    clock: Arc<dyn Clock>,
    config: SweepConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        // Shutdown is polled first so a stopped scheduler never sweeps again.
        tokio::select! {
            biased;
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Sweep scheduler received shutdown signal");
                    return;
                }
            }
            _ = tokio::time::sleep(config.interval) => {}
        }

        let evicted = store.sweep(clock.now());

        info!(
            evicted = evicted,
            remaining = store.len(),
            stats = ?store.stats(),
            "Swept {} entries",
            evicted
        );
    }
}

/// Starts the sweep scheduler against the system clock with the given
/// interval.
pub fn start_sweep_scheduler(store: Arc<RelayStore>, interval: Duration) -> SweepScheduler {
    SweepScheduler::start(store, Arc::new(crate::storage::SystemClock), SweepConfig { interval })
}
