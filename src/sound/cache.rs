//! Memoized long-form ringtones in the shared container.
//!
//! Layout:
//! ```text
//! {shared_dir}/
//! ├── chime.wav            # user-supplied original
//! └── long.chime.wav       # generated, <prefix>.<name>.<type>
//! {bundle_dir}/
//! └── ringtone.wav         # packaged fallback original
//! ```

use super::SoundName;
use crate::audio::AudioLooper;
use crate::config::ServiceConfig;
use crate::error::{RingError, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of a generated asset. Depends only on the sound, never on which
/// directory supplied the original.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(prefix: &str, sound: &SoundName) -> Self {
        Self(format!("{}.{}", prefix, sound.file_name()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub struct SoundCache {
    cache_dir: PathBuf,
    shared_dir: PathBuf,
    bundle_dir: PathBuf,
    prefix: String,
    looper: AudioLooper,
}

impl SoundCache {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            cache_dir: config.cache_dir().to_path_buf(),
            shared_dir: config.shared_dir.clone(),
            bundle_dir: config.bundle_dir.clone(),
            prefix: config.cache_prefix.clone(),
            looper: AudioLooper::new(config.target_duration_secs),
        }
    }

    pub fn cache_path(&self, sound: &SoundName) -> PathBuf {
        self.cache_dir.join(CacheKey::new(&self.prefix, sound).as_str())
    }

    /// Shared custom sound first, then the bundled default.
    pub fn locate_source(&self, sound: &SoundName) -> Option<PathBuf> {
        let file_name = sound.file_name();
        [&self.shared_dir, &self.bundle_dir]
            .into_iter()
            .map(|dir| dir.join(&file_name))
            .find(|p| p.is_file())
    }

    /// Long-form asset for `sound`, or `None` when the caller should keep the original.
    pub fn resolve(&self, sound: &SoundName) -> Option<PathBuf> {
        match self.try_resolve(sound) {
            Ok(path) => Some(path),
            Err(RingError::SourceUnavailable { name, kind }) => {
                debug!("[cache] no source for {}.{}, keeping original sound", name, kind);
                None
            }
            Err(e) => {
                warn!("[cache] failed to extend {}: {}", sound.file_name(), e);
                None
            }
        }
    }

    pub fn try_resolve(&self, sound: &SoundName) -> Result<PathBuf> {
        let cached = self.cache_path(sound);
        if cached.is_file() {
            debug!("[cache] hit {}", cached.display());
            return Ok(cached);
        }
        let source = self
            .locate_source(sound)
            .ok_or_else(|| RingError::SourceUnavailable {
                name: sound.name.clone(),
                kind: sound.kind.clone(),
            })?;
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.looper.extend(&source, &cached)?;
        info!("[cache] generated {} from {}", path.display(), source.display());
        Ok(path)
    }

    /// Delete every generated asset. Returns how many files were removed.
    pub fn purge(&self) -> Result<usize> {
        if !self.cache_dir.is_dir() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.is_file() && self.is_generated(&path) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn is_generated(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        file_name
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(SoundName::parse)
            .is_some()
    }
}
