//! Looping a short PCM clip out to a fixed-duration asset.

mod buffer;
mod looper;

pub use buffer::SampleBuffer;
pub use looper::{AudioAsset, AudioLooper};
