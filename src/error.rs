//! Error taxonomy for the ringtone pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RingError {
    /// Neither a shared custom asset nor a bundled default exists.
    #[error("no source asset for {name}.{kind}")]
    SourceUnavailable { name: String, kind: String },

    #[error("audio I/O failed: {0}")]
    AudioIo(#[from] hound::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    /// Source asset has no readable frames; looping it would never reach the target.
    #[error("source asset has zero frames: {}", .0.display())]
    DegenerateSource(PathBuf),

    #[error("target duration must be finite, got {0}")]
    InvalidDuration(f64),

    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RingError>;

impl From<serde_json::Error> for RingError {
    fn from(e: serde_json::Error) -> Self {
        RingError::Config(e.to_string())
    }
}
