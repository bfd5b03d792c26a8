//! Reader configuration and persisted user settings.

use serde::{Deserialize, Serialize};

use crate::pacer::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE, MIN_WPM};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    pub wpm: u32,
    pub min_wpm: u32,
    pub wpm_step: u32,
    pub chunk_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            wpm: 300,
            min_wpm: MIN_WPM,
            wpm_step: 25,
            chunk_size: MIN_CHUNK_SIZE,
        }
    }
}

impl ReaderConfig {
    /// Overlay restored user settings on top of these defaults.
    pub fn with_settings(mut self, settings: ReaderSettings) -> Self {
        self.wpm = settings.wpm.max(self.min_wpm);
        self.chunk_size = settings.chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        self
    }
}

/// User-tunable settings that survive restarts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    pub wpm: u32,
    pub chunk_size: usize,
}

impl ReaderSettings {
    pub const fn new(wpm: u32, chunk_size: usize) -> Self {
        Self { wpm, chunk_size }
    }
}

impl From<ReaderConfig> for ReaderSettings {
    fn from(config: ReaderConfig) -> Self {
        Self::new(config.wpm, config.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restored_settings_are_clamped() {
        let config = ReaderConfig::default().with_settings(ReaderSettings::new(40, 9));
        assert_eq!(config.wpm, MIN_WPM);
        assert_eq!(config.chunk_size, MAX_CHUNK_SIZE);

        let config = ReaderConfig::default().with_settings(ReaderSettings::new(450, 0));
        assert_eq!(config.wpm, 450);
        assert_eq!(config.chunk_size, MIN_CHUNK_SIZE);
    }

    #[test]
    fn settings_use_camel_case_keys() {
        let json = serde_json::to_string(&ReaderSettings::new(350, 2)).unwrap();
        assert_eq!(json, r#"{"wpm":350,"chunkSize":2}"#);
    }
}
