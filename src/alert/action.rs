use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

/// A side effect fired once per repeater cycle. Fire-and-forget: nothing to await.
pub trait AlertAction: Send + Sync {
    fn perform(&self);
}

/// Haptic pulse. The platform vibration call is outside this crate; here each
/// pulse is counted and logged so hosts and logs can see the cadence.
#[derive(Debug, Default)]
pub struct Vibration {
    pulses: AtomicU64,
}

impl Vibration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> u64 {
        self.pulses.load(Ordering::Relaxed)
    }
}

impl AlertAction for Vibration {
    fn perform(&self) {
        let n = self.pulses.fetch_add(1, Ordering::Relaxed) + 1;
        info!("[vibrate] pulse #{}", n);
    }
}
