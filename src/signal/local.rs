use super::{SessionId, StopChannel};
use crate::alert::CancelFlag;
use lazy_static::lazy_static;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

lazy_static! {
    static ref GLOBAL_CHANNEL: Arc<LocalStopChannel> = Arc::new(LocalStopChannel::new());
}

/// Process-wide stop channel shared by every session in this process.
pub fn global_channel() -> Arc<dyn StopChannel> {
    GLOBAL_CHANNEL.clone()
}

/// In-process observer registry: channel name -> session id -> weak flag.
#[derive(Default)]
pub struct LocalStopChannel {
    observers: Mutex<HashMap<String, HashMap<SessionId, Weak<CancelFlag>>>>,
}

impl LocalStopChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer_count(&self, channel: &str) -> usize {
        self.observers
            .lock()
            .unwrap()
            .get(channel)
            .map_or(0, |m| m.len())
    }
}

impl StopChannel for LocalStopChannel {
    fn register(&self, channel: &str, id: SessionId, flag: Weak<CancelFlag>) {
        self.observers
            .lock()
            .unwrap()
            .entry(channel.to_string())
            .or_default()
            .insert(id, flag);
    }

    fn unregister(&self, channel: &str, id: SessionId) -> bool {
        let mut observers = self.observers.lock().unwrap();
        let Some(sessions) = observers.get_mut(channel) else {
            return false;
        };
        let removed = sessions.remove(&id).is_some();
        if sessions.is_empty() {
            observers.remove(channel);
        }
        removed
    }

    fn signal(&self, channel: &str) -> usize {
        // Resolve handles under the lock, cancel outside it.
        let live: Vec<Arc<CancelFlag>> = {
            let observers = self.observers.lock().unwrap();
            observers
                .get(channel)
                .map(|m| m.values().filter_map(Weak::upgrade).collect())
                .unwrap_or_default()
        };
        for flag in &live {
            flag.cancel();
        }
        debug!("[stop] signal on {} reached {} sessions", channel, live.len());
        live.len()
    }
}
