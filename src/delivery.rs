//! Deliver one notification to the host: hand back the content, then keep the
//! alert going until a stop is posted or the host deadline passes.

use crate::alert::AlertAction;
use crate::config::ServiceConfig;
use crate::paths;
use crate::session::{NotificationSession, Payload};
use crate::signal::{MarkerFileSignal, StopChannel, StopSignalBridge};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct DeliveryTiming {
    /// Host-imposed limit; past it the held content is delivered and the alert stops.
    pub deadline: Duration,
    /// How often the cross-process stop marker is checked.
    pub marker_poll: Duration,
}

impl Default for DeliveryTiming {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(30),
            marker_poll: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Not a call, or the loop never ran: delivered as soon as prepared.
    Immediate,
    /// A stop signal ended the alert before the deadline.
    Stopped,
    /// The deadline ended the alert.
    Expired,
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub content: Payload,
    pub outcome: DeliveryOutcome,
}

/// Never fails: storage problems degrade to the original sound. `on_ready`
/// receives the outbound content once, before any waiting.
pub async fn deliver(
    payload: Payload,
    config: &ServiceConfig,
    channel: Arc<dyn StopChannel>,
    action: Arc<dyn AlertAction>,
    timing: DeliveryTiming,
    on_ready: impl FnOnce(&Payload),
) -> Delivery {
    if let Err(e) = paths::ensure_directories(config) {
        warn!("[deliver] shared storage unavailable, original sound kept: {}", e);
    }

    // Baseline first, so a stop posted while the sound is prepared still counts.
    let marker = MarkerFileSignal::new(&config.shared_dir, &config.stop_channel);
    let baseline = marker.read_token();

    let bridge = StopSignalBridge::new(channel.clone(), config.stop_channel.clone());
    let mut session = NotificationSession::start(payload, config, &bridge, action);
    let watcher = session.is_alerting().then(|| {
        marker.watch_since(baseline, channel, config.stop_channel.clone(), timing.marker_poll)
    });

    on_ready(&session.content());

    let outcome = match tokio::time::timeout(timing.deadline, session.wait()).await {
        Ok(Some(pulses)) => {
            info!("[deliver] stopped after {} pulses", pulses);
            DeliveryOutcome::Stopped
        }
        Ok(None) => DeliveryOutcome::Immediate,
        Err(_) => {
            session.expire();
            DeliveryOutcome::Expired
        }
    };

    let content = session.finish().await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }
    Delivery { content, outcome }
}
