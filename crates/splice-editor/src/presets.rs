//! Editor presets: a canvas and matching export settings.

use serde::{Deserialize, Serialize};
use splice_core::{FrameRate, SpliceError, TimelineDefaults};
use splice_media::ExportSettings;
use splice_timeline::TimelineSettings;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorPreset {
    /// Configured canvas, standard H.264 output.
    #[default]
    Basic,
    HighQuality,
    /// Vertical 1080x1920 at 30 fps.
    SocialMedia,
    /// 1080p30 with 48 kHz stereo audio.
    Course,
}

impl EditorPreset {
    pub const ALL: [EditorPreset; 4] = [
        Self::Basic,
        Self::HighQuality,
        Self::SocialMedia,
        Self::Course,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::HighQuality => "high-quality",
            Self::SocialMedia => "social-media",
            Self::Course => "course",
        }
    }

    /// Canvas for a new timeline, starting from the configured defaults.
    pub fn timeline_settings(self, defaults: &TimelineDefaults) -> TimelineSettings {
        let base = TimelineSettings::from(defaults);
        match self {
            Self::Basic | Self::HighQuality => base,
            Self::SocialMedia => TimelineSettings {
                width: 1080,
                height: 1920,
                frame_rate: FrameRate::FPS_30,
                ..base
            },
            Self::Course => TimelineSettings {
                width: 1920,
                height: 1080,
                frame_rate: FrameRate::FPS_30,
                audio_sample_rate: 48000,
                audio_channels: 2,
            },
        }
    }

    pub fn export_settings(self, output_path: impl Into<PathBuf>) -> ExportSettings {
        match self {
            Self::Basic => ExportSettings::new(output_path),
            Self::HighQuality => ExportSettings::high_quality(output_path),
            Self::SocialMedia => ExportSettings::social_media(output_path),
            Self::Course => ExportSettings::course(output_path),
        }
    }
}

impl fmt::Display for EditorPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditorPreset {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .or(match normalized.as_str() {
                "standard" => Some(Self::Basic),
                "social" => Some(Self::SocialMedia),
                _ => None,
            })
            .ok_or_else(|| SpliceError::InvalidParameter(format!("unknown preset '{s}'")))
    }
}
