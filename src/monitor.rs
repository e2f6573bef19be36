//! Periodic open-status re-evaluation for the details view.
//!
//! The details screen shows an open/closed badge that must track wall-clock
//! time while the screen is visible. This is a cancellable repeating task:
//! it re-evaluates the schedule on a fixed interval and must be stopped
//! (or dropped) when the view is torn down so no work leaks afterwards.

use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::schedule::OperationSchedule;

/// Re-evaluates a schedule every minute and publishes the result.
pub struct OpenStatusMonitor {
    rx: watch::Receiver<bool>,
    handle: JoinHandle<()>,
}

impl OpenStatusMonitor {
    /// Interval the details view uses between re-evaluations.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

    /// Start monitoring with the default 60 second interval.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(schedule: OperationSchedule) -> Self {
        Self::with_interval(schedule, Self::DEFAULT_INTERVAL)
    }

    /// Start monitoring with a custom interval (used by tests).
    pub fn with_interval(schedule: OperationSchedule, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(schedule.is_open_now());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; the initial value
            // already covers it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let open = schedule.is_open_now();
                debug!("[OpenStatusMonitor] re-evaluated: open={open}");
                if tx.send(open).is_err() {
                    break;
                }
            }
        });

        Self { rx, handle }
    }

    /// The most recently evaluated open/closed state.
    pub fn current(&self) -> bool {
        *self.rx.borrow()
    }

    /// Subscribe to state changes (for the view's event loop).
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    /// Cancel the repeating task. Idempotent; also runs on drop.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for OpenStatusMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
