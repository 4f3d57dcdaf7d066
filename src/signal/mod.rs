//! Stop channel between the owning app and live alert sessions.
//!
//! Observers are keyed by (channel name, session id) and hold only a weak
//! handle to the session's flag. Removal is tied to [`Registration`], so it
//! happens exactly once at session teardown.

mod local;
mod marker;

pub use local::{global_channel, LocalStopChannel};
pub use marker::MarkerFileSignal;

use crate::alert::CancelFlag;
use log::{debug, warn};
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Register/unregister/signal, injectable so tests can post signals without a real transport.
pub trait StopChannel: Send + Sync {
    fn register(&self, channel: &str, id: SessionId, flag: Weak<CancelFlag>);
    /// Returns false if no observer was registered for this pair.
    fn unregister(&self, channel: &str, id: SessionId) -> bool;
    /// Cancel every live observer on `channel`. Returns how many were cancelled.
    fn signal(&self, channel: &str) -> usize;
}

#[derive(Clone)]
pub struct StopSignalBridge {
    channel: Arc<dyn StopChannel>,
    name: String,
}

impl StopSignalBridge {
    pub fn new(channel: Arc<dyn StopChannel>, name: impl Into<String>) -> Self {
        Self {
            channel,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register(&self, flag: &Arc<CancelFlag>) -> Registration {
        let id = SessionId::new();
        self.channel.register(&self.name, id, Arc::downgrade(flag));
        debug!("[stop] registered session {} on {}", id, self.name);
        Registration {
            channel: self.channel.clone(),
            name: self.name.clone(),
            id,
            active: true,
        }
    }

    pub fn signal_stop(&self) -> usize {
        self.channel.signal(&self.name)
    }
}

/// Live observer entry. Unregisters on [`Registration::unregister`] or on drop.
pub struct Registration {
    channel: Arc<dyn StopChannel>,
    name: String,
    id: SessionId,
    active: bool,
}

impl Registration {
    pub fn unregister(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if self.channel.unregister(&self.name, self.id) {
            debug!("[stop] unregistered session {} from {}", self.id, self.name);
        } else {
            // Reachable from Drop while unwinding; must not panic.
            warn!("[stop] session {} was not registered on {}", self.id, self.name);
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}
