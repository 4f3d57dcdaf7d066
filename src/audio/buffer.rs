//! Fixed-capacity, channel-major sample storage used by the looper.
//! One buffer per loop iteration; never reused across iterations.

use crate::error::Result;
use hound::{Sample, WavWriter};
use std::io::{Seek, Write};

pub struct SampleBuffer<S> {
    channels: Vec<Vec<S>>,
    capacity: usize,
    frame_len: usize, // frames actually filled, <= capacity
}

impl<S: Sample + Copy + Default> SampleBuffer<S> {
    pub fn with_capacity(channels: u16, frames: usize) -> Self {
        Self {
            channels: (0..channels.max(1)).map(|_| vec![S::default(); frames]).collect(),
            capacity: frames,
            frame_len: 0,
        }
    }

    /// Fill from an interleaved sample stream until capacity or end of stream.
    /// Returns the number of whole frames read.
    pub fn read_interleaved<I>(&mut self, mut samples: I) -> Result<usize>
    where
        I: Iterator<Item = std::result::Result<S, hound::Error>>,
    {
        let channel_count = self.channels.len();
        self.frame_len = 0;
        'frames: for frame in 0..self.capacity {
            for ch in 0..channel_count {
                match samples.next() {
                    Some(sample) => self.channels[ch][frame] = sample?,
                    None if ch == 0 => break 'frames,
                    None => return Err(hound::Error::FormatError("partial frame at end of data").into()),
                }
            }
            self.frame_len = frame + 1;
        }
        Ok(self.frame_len)
    }

    /// Copy the leading `frames` of every channel into a new buffer of exactly that capacity.
    pub fn truncated(&self, frames: usize) -> Self {
        let frames = frames.min(self.frame_len);
        let channels = self
            .channels
            .iter()
            .map(|src| {
                let mut dst = vec![S::default(); frames];
                dst.copy_from_slice(&src[..frames]);
                dst
            })
            .collect();
        Self {
            channels,
            capacity: frames,
            frame_len: frames,
        }
    }

    pub fn write_interleaved<W: Write + Seek>(&self, writer: &mut WavWriter<W>) -> Result<()> {
        for frame in 0..self.frame_len {
            for channel in &self.channels {
                writer.write_sample(channel[frame])?;
            }
        }
        Ok(())
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_len == 0
    }

    #[cfg(test)]
    fn channel(&self, ch: usize) -> &[S] {
        &self.channels[ch][..self.frame_len]
    }
}
