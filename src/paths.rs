//! Path utilities for the shared container, bundled sounds, config, and logs.

use crate::config::ServiceConfig;
use crate::error::Result;
use std::path::PathBuf;

const APP_DIR: &str = "callring";

/// Per-user data directory (e.g. ~/.local/share/callring on Linux).
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Shared container reachable by the owning app and this service.
/// Holds user-supplied sounds and the generated long-form cache.
pub fn shared_dir() -> PathBuf {
    data_dir().join("shared")
}

/// Sounds packaged with the service, used when no custom sound exists.
pub fn bundle_dir() -> PathBuf {
    data_dir().join("bundle")
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Get the log file path, creating its directory if necessary.
pub fn log_file_path() -> Result<PathBuf> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("callring.log"))
}

/// Ensure the configured shared and bundle directories exist.
pub fn ensure_directories(config: &ServiceConfig) -> Result<()> {
    std::fs::create_dir_all(&config.shared_dir)?;
    std::fs::create_dir_all(&config.bundle_dir)?;
    Ok(())
}
