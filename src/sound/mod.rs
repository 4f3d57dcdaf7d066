//! Resolving a notification's declared sound to a long-form asset.

mod cache;
mod name;

pub use cache::{CacheKey, SoundCache};
pub use name::SoundName;

/// The one container type the looper reads and writes (RIFF/WAVE linear PCM).
pub const SOUND_TYPE: &str = "wav";
