//! Perform an action, wait a fixed interval, repeat until cancelled.
//!
//! The flag is checked after every wait, immediately before acting, and a
//! cancellation also cuts the current wait short. So once `cancel()` returns,
//! at most the action already in progress completes and none follows.

use super::AlertAction;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Shared stop flag: written by the stop bridge or the host deadline, read by the loop.
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancelled: AtomicBool,
    wake: Notify,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        // Stores a permit if the loop is not waiting yet.
        self.wake.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeaterState {
    Running,
    Stopped,
}

impl RepeaterState {
    pub fn of(flag: &CancelFlag) -> Self {
        if flag.is_cancelled() {
            RepeaterState::Stopped
        } else {
            RepeaterState::Running
        }
    }
}

pub struct CancellableRepeater {
    action: Arc<dyn AlertAction>,
    interval: Duration,
}

impl CancellableRepeater {
    pub fn new(action: Arc<dyn AlertAction>, interval: Duration) -> Self {
        Self { action, interval }
    }

    /// Runs until `flag` is cancelled. Returns how many actions were performed.
    pub async fn run(&self, flag: &CancelFlag) -> usize {
        let mut performed = 0;
        while RepeaterState::of(flag) == RepeaterState::Running {
            self.action.perform();
            performed += 1;
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = flag.wake.notified() => {}
            }
        }
        debug!("[repeater] stopped after {} actions", performed);
        performed
    }

    pub fn spawn(self, flag: Arc<CancelFlag>) -> JoinHandle<usize> {
        tokio::spawn(async move { self.run(&flag).await })
    }
}
