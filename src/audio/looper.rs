//! Extend a short PCM WAV clip to a fixed duration by repeating it.
//!
//! Output keeps the source format exactly (rate, channels, bit depth); the final
//! repetition is cut on a frame boundary so the output holds exactly
//! `floor(target_secs * sample_rate)` frames.

use super::buffer::SampleBuffer;
use crate::error::{RingError, Result};
use hound::{Sample, SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Format and length of a WAV asset on disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioAsset {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_format: SampleFormat,
    pub frames: u32,
}

impl AudioAsset {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();
        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            sample_format: spec.sample_format,
            frames: reader.duration(),
        })
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AudioLooper {
    target_duration_secs: f64,
}

impl AudioLooper {
    pub fn new(target_duration_secs: f64) -> Self {
        Self {
            target_duration_secs: target_duration_secs.max(0.0),
        }
    }

    pub fn target_frames(&self, sample_rate: u32) -> u64 {
        (self.target_duration_secs * sample_rate as f64).floor() as u64
    }

    /// Write `source` looped to the target duration at `dest`, replacing any existing file.
    ///
    /// Data goes to a sibling temp file first and is renamed into place, so a
    /// concurrent reader never sees a half-written asset.
    pub fn extend(&self, source: &Path, dest: &Path) -> Result<PathBuf> {
        if !self.target_duration_secs.is_finite() {
            return Err(RingError::InvalidDuration(self.target_duration_secs));
        }
        let mut reader = WavReader::open(source)?;
        let spec = reader.spec();
        let partial = partial_path(dest);

        match self.write_looped(&mut reader, spec, source, &partial) {
            Ok((frames, repetitions)) => {
                fs::rename(&partial, dest)?;
                debug!(
                    "[looper] {} -> {} ({} frames, {} repetitions)",
                    source.display(),
                    dest.display(),
                    frames,
                    repetitions
                );
                Ok(dest.to_path_buf())
            }
            Err(e) => {
                let _ = fs::remove_file(&partial);
                Err(e)
            }
        }
    }

    fn write_looped(
        &self,
        reader: &mut WavReader<BufReader<File>>,
        spec: WavSpec,
        source: &Path,
        out: &Path,
    ) -> Result<(u64, usize)> {
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, _) => self.loop_samples::<f32>(reader, spec, source, out),
            (SampleFormat::Int, 0..=8) => self.loop_samples::<i8>(reader, spec, source, out),
            (SampleFormat::Int, 9..=16) => self.loop_samples::<i16>(reader, spec, source, out),
            (SampleFormat::Int, _) => self.loop_samples::<i32>(reader, spec, source, out),
        }
    }

    /// Returns (frames written, buffers written).
    fn loop_samples<S: Sample + Copy + Default>(
        &self,
        reader: &mut WavReader<BufReader<File>>,
        spec: WavSpec,
        source: &Path,
        out: &Path,
    ) -> Result<(u64, usize)> {
        let source_frames = reader.duration() as usize;
        let target_frames = self.target_frames(spec.sample_rate);
        let mut writer = WavWriter::create(out, spec)?;
        let mut current_frames: u64 = 0;
        let mut repetitions = 0;

        while current_frames < target_frames {
            // Whole clip per read: a fixed chunk larger than a short clip would never advance.
            let mut buffer = SampleBuffer::<S>::with_capacity(spec.channels, source_frames);
            let read = buffer.read_interleaved(reader.samples::<S>())?;
            if read == 0 {
                return Err(RingError::DegenerateSource(source.to_path_buf()));
            }
            repetitions += 1;

            let remaining = target_frames - current_frames;
            if read as u64 > remaining {
                let tail = buffer.truncated(remaining as usize);
                tail.write_interleaved(&mut writer)?;
                current_frames += remaining;
                break;
            }

            buffer.write_interleaved(&mut writer)?;
            current_frames += read as u64;
            reader.seek(0)?;
        }

        writer.finalize()?;
        Ok((current_frames, repetitions))
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());
    dest.with_file_name(format!(".{}.{}.partial", name, uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn spec(channels: u16, sample_rate: u32) -> WavSpec {
        WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    fn write_i16(path: &Path, spec: WavSpec, samples: &[i16]) {
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn read_i16(path: &Path) -> (WavSpec, Vec<i16>) {
        let mut reader = WavReader::open(path).unwrap();
        let samples = reader.samples::<i16>().collect::<std::result::Result<Vec<_>, _>>().unwrap();
        (reader.spec(), samples)
    }

    fn ramp(len: usize) -> Vec<i16> {
        (0..len).map(|i| (i % 30_000) as i16 - 15_000).collect()
    }

    #[test]
    fn test_three_second_clip_to_thirty_seconds() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("chime.wav");
        let dst = tmp.path().join("long.chime.wav");
        let clip = ramp(48_000);
        write_i16(&src, spec(1, 16_000), &clip);

        let out = AudioLooper::new(30.0).extend(&src, &dst).unwrap();
        assert_eq!(out, dst);

        let (out_spec, samples) = read_i16(&dst);
        assert_eq!(out_spec, spec(1, 16_000));
        assert_eq!(samples.len(), 480_000);
        for (rep, chunk) in samples.chunks(clip.len()).enumerate() {
            assert_eq!(chunk, &clip[..], "repetition {} differs", rep);
        }
        assert_eq!(samples.chunks(clip.len()).count(), 10);
    }

    #[test]
    fn test_truncates_final_repetition_on_frame_boundary() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("stereo.wav");
        let dst = tmp.path().join("out.wav");
        // 1000 stereo frames at 8 kHz; 0.3 s target = 2400 frames = 2.4 repetitions.
        let clip = ramp(2000);
        write_i16(&src, spec(2, 8_000), &clip);

        AudioLooper::new(0.3).extend(&src, &dst).unwrap();

        let asset = AudioAsset::open(&dst).unwrap();
        assert_eq!(asset.frames, 2400);
        assert_eq!(asset.channels, 2);
        let (_, samples) = read_i16(&dst);
        for (i, s) in samples.iter().enumerate() {
            assert_eq!(*s, clip[i % clip.len()], "sample {}", i);
        }
    }

    #[test]
    fn test_target_frames_floors() {
        let looper = AudioLooper::new(0.00011);
        assert_eq!(looper.target_frames(10_000), 1);
        assert_eq!(AudioLooper::new(30.0).target_frames(44_100), 1_323_000);
    }

    #[test]
    fn test_source_longer_than_target() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("long.wav");
        let dst = tmp.path().join("out.wav");
        let clip = ramp(1000);
        write_i16(&src, spec(1, 1_000), &clip);

        AudioLooper::new(0.25).extend(&src, &dst).unwrap();
        let (_, samples) = read_i16(&dst);
        assert_eq!(samples, clip[..250].to_vec());
    }

    #[test]
    fn test_output_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("clip.wav");
        write_i16(&src, spec(2, 11_025), &ramp(3_000));
        let a = tmp.path().join("a.wav");
        let b = tmp.path().join("b.wav");
        let looper = AudioLooper::new(2.7);
        looper.extend(&src, &a).unwrap();
        looper.extend(&src, &b).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn test_overwrites_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("clip.wav");
        let dst = tmp.path().join("out.wav");
        write_i16(&src, spec(1, 1_000), &ramp(100));
        fs::write(&dst, b"stale").unwrap();
        AudioLooper::new(1.0).extend(&src, &dst).unwrap();
        assert_eq!(AudioAsset::open(&dst).unwrap().frames, 1000);
    }

    #[test]
    fn test_zero_length_source_is_error_not_hang() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("empty.wav");
        let dst = tmp.path().join("out.wav");
        write_i16(&src, spec(1, 16_000), &[]);

        let (tx, rx) = mpsc::channel();
        let (s, d) = (src.clone(), dst.clone());
        std::thread::spawn(move || {
            let _ = tx.send(AudioLooper::new(30.0).extend(&s, &d));
        });
        let result = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("extend did not finish");
        assert!(matches!(result, Err(RingError::DegenerateSource(_))));
        assert!(!dst.exists());
        // No stray temp files either.
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_missing_source_is_audio_error() {
        let tmp = TempDir::new().unwrap();
        let result = AudioLooper::new(1.0).extend(&tmp.path().join("nope.wav"), &tmp.path().join("out.wav"));
        assert!(matches!(result, Err(RingError::AudioIo(_))));
    }

    #[test]
    fn test_non_wav_source_is_audio_error() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("bad.wav");
        fs::write(&src, b"definitely not riff").unwrap();
        let result = AudioLooper::new(1.0).extend(&src, &tmp.path().join("out.wav"));
        assert!(matches!(result, Err(RingError::AudioIo(_))));
    }

    #[test]
    fn test_preserves_float_format() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("float.wav");
        let dst = tmp.path().join("out.wav");
        let float_spec = WavSpec {
            channels: 1,
            sample_rate: 4_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let clip: Vec<f32> = (0..300).map(|i| (i as f32 / 300.0) - 0.5).collect();
        let mut writer = WavWriter::create(&src, float_spec).unwrap();
        for &s in &clip {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        AudioLooper::new(0.2).extend(&src, &dst).unwrap();
        let mut reader = WavReader::open(&dst).unwrap();
        assert_eq!(reader.spec(), float_spec);
        let out: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(out.len(), 800);
        for (i, s) in out.iter().enumerate() {
            assert_eq!(s.to_bits(), clip[i % clip.len()].to_bits());
        }
    }

    #[test]
    fn test_preserves_24_bit_int() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("deep.wav");
        let dst = tmp.path().join("out.wav");
        let deep = WavSpec {
            channels: 1,
            sample_rate: 1_000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let clip: Vec<i32> = (0..64).map(|i| (i - 32) * 200_000).collect();
        let mut writer = WavWriter::create(&src, deep).unwrap();
        for &s in &clip {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        AudioLooper::new(0.1).extend(&src, &dst).unwrap();
        let mut reader = WavReader::open(&dst).unwrap();
        assert_eq!(reader.spec(), deep);
        let out: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(out.len(), 100);
        assert_eq!(&out[64..], &clip[..36]);
    }

    #[test]
    fn test_infinite_target_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("clip.wav");
        let dst = tmp.path().join("out.wav");
        write_i16(&src, spec(1, 1_000), &ramp(100));

        let result = AudioLooper::new(f64::INFINITY).extend(&src, &dst);
        assert!(matches!(result, Err(RingError::InvalidDuration(_))));
        assert!(!dst.exists());
        // NaN clamps to an empty asset rather than a runaway loop.
        AudioLooper::new(f64::NAN).extend(&src, &dst).unwrap();
        assert_eq!(AudioAsset::open(&dst).unwrap().frames, 0);
    }

    #[test]
    fn test_asset_duration() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("clip.wav");
        write_i16(&src, spec(2, 16_000), &ramp(64_000));
        let asset = AudioAsset::open(&src).unwrap();
        assert_eq!(asset.frames, 32_000);
        assert_eq!(asset.duration_secs(), 2.0);
    }
}
