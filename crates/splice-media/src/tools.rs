//! Locating the ffmpeg and ffprobe executables.

use splice_core::ToolPaths;
use std::path::PathBuf;

/// Resolved executable locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocations {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolLocations {
    /// Configured paths win, then `PATH`, then the ffmpeg-sidecar location.
    pub fn resolve(config: &ToolPaths) -> Self {
        let ffmpeg = config
            .ffmpeg
            .clone()
            .or_else(|| which::which("ffmpeg").ok())
            .unwrap_or_else(ffmpeg_sidecar::paths::ffmpeg_path);
        let ffprobe = config
            .ffprobe
            .clone()
            .or_else(|| which::which("ffprobe").ok())
            .unwrap_or_else(|| ffmpeg.with_file_name(ffprobe_file_name()));
        tracing::debug!(
            ffmpeg = %ffmpeg.display(),
            ffprobe = %ffprobe.display(),
            "Resolved transcoder tools"
        );
        Self { ffmpeg, ffprobe }
    }

    /// Whether both executables can actually be found.
    pub fn is_available(&self) -> bool {
        which::which(&self.ffmpeg).is_ok() && which::which(&self.ffprobe).is_ok()
    }
}

fn ffprobe_file_name() -> &'static str {
    if cfg!(windows) {
        "ffprobe.exe"
    } else {
        "ffprobe"
    }
}
