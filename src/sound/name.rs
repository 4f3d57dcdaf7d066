use super::SOUND_TYPE;
use crate::config::ServiceConfig;
use log::debug;

/// A sound identified by base name and container type, e.g. ("chime", "wav").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundName {
    pub name: String,
    pub kind: String,
}

impl SoundName {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Accepts exactly `<name>.wav`: one dot, non-empty name.
    pub fn parse(declared: &str) -> Option<Self> {
        let (name, kind) = declared.split_once('.')?;
        if name.is_empty() || kind != SOUND_TYPE || name.contains(['/', '\\']) {
            return None;
        }
        Some(Self::new(name, kind))
    }

    /// Parse the payload's declared sound, substituting the configured default pair.
    pub fn from_declared_or_default(declared: Option<&str>, config: &ServiceConfig) -> Self {
        match declared.and_then(Self::parse) {
            Some(sound) => sound,
            None => {
                debug!("[sound] declared sound {:?} unusable, using default", declared);
                Self::new(&config.default_sound_name, &config.default_sound_type)
            }
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.kind)
    }
}
