//! One call-like notification: extended ringtone, stop listener, vibration loop.

use crate::alert::{AlertAction, CancelFlag, CancellableRepeater};
use crate::config::ServiceConfig;
use crate::signal::{Registration, StopSignalBridge};
use crate::sound::{SoundCache, SoundName};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;

const CALL_KEY: &str = "call";
const SOUND_KEY: &str = "sound";

/// Opaque notification fields as received from the host pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// `"call"` set to `true`, `1`, `"1"` or `"true"`.
    pub fn is_call(&self) -> bool {
        match self.0.get(CALL_KEY) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn sound(&self) -> Option<&str> {
        self.0.get(SOUND_KEY).and_then(Value::as_str)
    }

    pub fn set_sound(&mut self, sound: impl Into<String>) {
        self.0.insert(SOUND_KEY.to_string(), Value::String(sound.into()));
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

pub struct NotificationSession {
    content: Payload,
    flag: Arc<CancelFlag>,
    registration: Option<Registration>,
    repeater: Option<JoinHandle<usize>>,
}

impl NotificationSession {
    /// Prepare the outbound content and, for call alerts, start vibrating.
    ///
    /// Sound resolution is synchronous and happens before the listener and loop
    /// start. It never fails the session: on any problem the original sound is kept.
    /// Must be called inside a tokio runtime.
    pub fn start(
        payload: Payload,
        config: &ServiceConfig,
        bridge: &StopSignalBridge,
        action: Arc<dyn AlertAction>,
    ) -> Self {
        let flag = Arc::new(CancelFlag::new());
        if !payload.is_call() {
            debug!("[session] not a call, delivering as-is");
            return Self {
                content: payload,
                flag,
                registration: None,
                repeater: None,
            };
        }

        let mut content = payload;
        let sound = SoundName::from_declared_or_default(content.sound(), config);
        match SoundCache::new(config).resolve(&sound) {
            Some(path) => content.set_sound(path.to_string_lossy()),
            None => info!("[session] keeping original sound for {}", sound.file_name()),
        }

        let registration = bridge.register(&flag);
        let repeater = CancellableRepeater::new(action, config.vibrate_interval()).spawn(flag.clone());
        info!("[session] call alert started, stop channel {}", bridge.name());

        Self {
            content,
            flag,
            registration: Some(registration),
            repeater: Some(repeater),
        }
    }

    pub fn content(&self) -> Payload {
        self.content.clone()
    }

    pub fn is_alerting(&self) -> bool {
        !self.flag.is_cancelled() && self.repeater.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Host deadline: stop the loop and hand back what we have right now.
    pub fn expire(&self) -> Payload {
        warn!("[session] host deadline reached, delivering best content");
        self.flag.cancel();
        self.content.clone()
    }

    /// Wait for the vibration loop to stop. Returns the action count, or `None`
    /// if no loop is running.
    pub async fn wait(&mut self) -> Option<usize> {
        let handle = self.repeater.as_mut()?;
        let result = handle.await;
        self.repeater = None;
        match result {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("[session] repeater task failed: {}", e);
                None
            }
        }
    }

    /// Tear down: drop the stop observer first, then stop and join the loop.
    pub async fn finish(mut self) -> Payload {
        self.release_observer();
        self.flag.cancel();
        if let Some(n) = self.wait().await {
            debug!("[session] finished after {} pulses", n);
        }
        std::mem::take(&mut self.content)
    }

    fn release_observer(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.unregister();
        }
    }
}

impl Drop for NotificationSession {
    fn drop(&mut self) {
        self.release_observer();
        self.flag.cancel();
    }
}
