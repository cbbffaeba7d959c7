use crate::playback::{PairingMode, PlaybackConfig, DEFAULT_SEGMENT_DURATION_MS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub speed: f64,
    pub segment_duration_ms: f64,
    /// Frame clock period for real-time playback
    pub frame_interval_ms: u64,
    pub export_fps: u32,
    pub pairing: PairingMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            segment_duration_ms: DEFAULT_SEGMENT_DURATION_MS,
            frame_interval_ms: 16,
            export_fps: 30,
            pairing: PairingMode::ByIndex,
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tactics-board").join("settings.json"))
    }

    /// Load from the user config dir, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Using default settings: {:#}", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings: {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write settings: {:?}", path))?;
        Ok(())
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            speed: self.speed,
            segment_duration_ms: self.segment_duration_ms,
            pairing: self.pairing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"speed": 2.5, "pairing": "by_id"}"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.speed, 2.5);
        assert_eq!(settings.pairing, PairingMode::ById);
        assert_eq!(settings.frame_interval_ms, 16);
        assert_eq!(settings.playback_config().segment_duration_ms, DEFAULT_SEGMENT_DURATION_MS);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        let settings = AppSettings { export_fps: 60, ..Default::default() };

        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "###").unwrap();
        assert!(AppSettings::load_from(&path).is_err());
    }
}
