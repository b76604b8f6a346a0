//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SpliceError};
use crate::time::FrameRate;

/// Global editor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Root directory under which each export job gets a private directory.
    pub temp_dir: PathBuf,

    /// Overrides for external tool locations.
    pub tools: ToolPaths,

    /// Settings applied to new timelines.
    pub timeline: TimelineDefaults,

    /// Export housekeeping.
    pub export: ExportPolicy,

    /// Maximum number of undo steps kept per session.
    pub history_depth: usize,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Explicit paths for the external transcoding engine. `None` means
/// resolve at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

/// Output canvas for new timelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDefaults {
    pub frame_rate: FrameRate,
    pub width: u32,
    pub height: u32,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
}

/// What to do with export job directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPolicy {
    /// Leave the fragment directory of a failed job on disk for diagnostics.
    pub keep_failed_job_dirs: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "splice_media=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("splice"),
            tools: ToolPaths::default(),
            timeline: TimelineDefaults::default(),
            export: ExportPolicy::default(),
            history_depth: 200,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::FPS_30,
            width: 1920,
            height: 1080,
            audio_sample_rate: 48000,
            audio_channels: 2,
        }
    }
}

impl Default for ExportPolicy {
    fn default() -> Self {
        Self {
            keep_failed_job_dirs: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EditorConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let Some(config_path) = config_file_path() else {
            return Self::default();
        };
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "Ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path. Missing fields take their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SpliceError::Config(format!("{}: {e}", path.display())))
    }

    /// Write config as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SpliceError::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location (`<config dir>/splice/config.json`).
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("splice").join("config.json"))
}
