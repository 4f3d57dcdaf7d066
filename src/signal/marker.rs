//! Cross-process stop signal through a marker file in the shared container.
//!
//! Posting writes a fresh token to `<dir>/<channel>.signal`; a watcher in the
//! session process polls the file and forwards a changed token to its local
//! stop channel.

use super::StopChannel;
use crate::error::Result;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct MarkerFileSignal {
    path: PathBuf,
}

impl MarkerFileSignal {
    pub fn new(dir: &Path, channel: &str) -> Self {
        Self {
            path: dir.join(format!("{}.signal", channel)),
        }
    }

    /// Post a stop. Tokens strictly increase even if the clock does not.
    pub fn post(&self) -> Result<i64> {
        let now = chrono::Utc::now().timestamp_millis();
        let token = match self.read_token() {
            Some(prev) if prev >= now => prev + 1,
            _ => now,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, token.to_string())?;
        fs::rename(&tmp, &self.path)?;
        Ok(token)
    }

    pub fn read_token(&self) -> Option<i64> {
        fs::read_to_string(&self.path).ok()?.trim().parse().ok()
    }

    /// Poll until a token newer than the current one reaches a listener.
    pub fn watch(self, local: Arc<dyn StopChannel>, channel: String, poll: Duration) -> JoinHandle<()> {
        let baseline = self.read_token();
        self.watch_since(baseline, local, channel, poll)
    }

    /// Like [`MarkerFileSignal::watch`], but any token other than `baseline` counts,
    /// including one posted before this call. Read the baseline before the session
    /// starts and spawn the watcher once it has registered.
    ///
    /// The first check runs immediately. A post that finds no live session is
    /// not consumed; it is forwarded again on every poll until one listens.
    pub fn watch_since(
        self,
        baseline: Option<i64>,
        local: Arc<dyn StopChannel>,
        channel: String,
        poll: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll);
            let mut warned = false;
            loop {
                interval.tick().await;
                let current = self.read_token();
                if current.is_none() || current == baseline {
                    continue;
                }
                if local.signal(&channel) > 0 {
                    info!("[stop] marker {} posted", self.path.display());
                    break;
                }
                if !warned {
                    warn!("[stop] marker posted but no session listening on {}", channel);
                    warned = true;
                }
            }
        })
    }
}
