//! Service configuration with JSON file and environment variable loading.
//!
//! Environment variables:
//! - `CALLRING_SHARED_DIR`: shared container directory
//! - `CALLRING_BUNDLE_DIR`: bundled default sounds directory
//! - `CALLRING_TARGET_SECS`: length of generated ringtones in seconds
//! - `CALLRING_INTERVAL_MS`: pause between vibration pulses

use crate::error::Result;
use crate::paths;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// User-supplied sounds and generated `<prefix>.<name>.<type>` files live here.
    pub shared_dir: PathBuf,
    pub bundle_dir: PathBuf,
    pub cache_prefix: String,
    pub target_duration_secs: f64,
    pub vibrate_interval_ms: u64,
    /// Name of the process-wide stop channel.
    pub stop_channel: String,
    pub default_sound_name: String,
    pub default_sound_type: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            shared_dir: paths::shared_dir(),
            bundle_dir: paths::bundle_dir(),
            cache_prefix: "long".to_string(),
            target_duration_secs: 30.0,
            vibrate_interval_ms: 2000,
            stop_channel: "callring.stop-vibration".to_string(),
            default_sound_name: "ringtone".to_string(),
            default_sound_type: crate::sound::SOUND_TYPE.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load from a JSON file. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        let config: ServiceConfig = serde_json::from_str(&json)?;
        Ok(Some(config))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Overlay environment variables. Malformed numbers are logged and ignored.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = var("CALLRING_SHARED_DIR") {
            self.shared_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("CALLRING_BUNDLE_DIR") {
            self.bundle_dir = PathBuf::from(dir);
        }
        if let Some(secs) = var("CALLRING_TARGET_SECS") {
            match secs.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => self.target_duration_secs = v,
                _ => warn!("[config] ignoring CALLRING_TARGET_SECS={}", secs),
            }
        }
        if let Some(ms) = var("CALLRING_INTERVAL_MS") {
            match ms.parse::<u64>() {
                Ok(v) => self.vibrate_interval_ms = v,
                Err(_) => warn!("[config] ignoring CALLRING_INTERVAL_MS={}", ms),
            }
        }
        self
    }

    /// File (or defaults when absent) followed by environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let default_path = paths::config_path();
        let path = path.unwrap_or(&default_path);
        let config = Self::load(path)?.unwrap_or_default();
        Ok(config.apply_env())
    }

    pub fn vibrate_interval(&self) -> Duration {
        Duration::from_millis(self.vibrate_interval_ms)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.shared_dir
    }
}
