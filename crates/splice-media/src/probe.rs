//! Media file probing through ffprobe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use splice_core::{FrameRate, RationalTime, Result, SpliceError};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Information about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// File path
    pub path: PathBuf,
    /// Duration
    pub duration: RationalTime,
    /// Container format
    pub format: String,
    /// Video streams
    pub video_streams: Vec<VideoStreamInfo>,
    /// Audio streams
    pub audio_streams: Vec<AudioStreamInfo>,
}

/// Information about a video stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub index: usize,
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<FrameRate>,
    pub pixel_format: Option<String>,
}

/// Information about an audio stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub index: usize,
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl MediaInfo {
    pub fn has_video(&self) -> bool {
        !self.video_streams.is_empty()
    }

    pub fn has_audio(&self) -> bool {
        !self.audio_streams.is_empty()
    }

    pub fn primary_video(&self) -> Option<&VideoStreamInfo> {
        self.video_streams.first()
    }

    pub fn primary_audio(&self) -> Option<&AudioStreamInfo> {
        self.audio_streams.first()
    }

    /// Width of the primary video stream, 0 for audio-only media.
    pub fn width(&self) -> u32 {
        self.primary_video().map_or(0, |v| v.width)
    }

    pub fn height(&self) -> u32 {
        self.primary_video().map_or(0, |v| v.height)
    }

    pub fn frame_rate(&self) -> Option<FrameRate> {
        self.primary_video().and_then(|v| v.frame_rate)
    }
}

/// Queries intrinsic properties of a media file.
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Probe `path`. Fails with `ProbeFailed` when the file is missing,
    /// unreadable, or has no positive duration.
    async fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

/// [`MediaProber`] backed by the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let fail = |reason: String| SpliceError::ProbeFailed {
            path: path.to_path_buf(),
            reason,
        };
        if !path.exists() {
            return Err(fail("file not found".into()));
        }

        tracing::debug!(path = %path.display(), "Probing media");
        let output = tokio::process::Command::new(&self.ffprobe)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| fail(format!("failed to run {}: {e}", self.ffprobe.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        parse_ffprobe_json(path, &output.stdout)
    }
}

// ── ffprobe JSON ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    pix_fmt: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
    duration: Option<String>,
}

/// Turn `ffprobe -print_format json -show_format -show_streams` output into
/// [`MediaInfo`].
pub fn parse_ffprobe_json(path: &Path, data: &[u8]) -> Result<MediaInfo> {
    let fail = |reason: String| SpliceError::ProbeFailed {
        path: path.to_path_buf(),
        reason,
    };
    let raw: ProbeOutput =
        serde_json::from_slice(data).map_err(|e| fail(format!("unreadable ffprobe output: {e}")))?;

    let mut video_streams = Vec::new();
    let mut audio_streams = Vec::new();
    let mut stream_duration: Option<f64> = None;
    for stream in raw.streams {
        let codec = stream.codec_name.unwrap_or_default();
        if let Some(d) = stream.duration.as_deref().and_then(|d| d.parse::<f64>().ok()) {
            stream_duration = Some(stream_duration.map_or(d, |cur| cur.max(d)));
        }
        match stream.codec_type.as_deref() {
            Some("video") => video_streams.push(VideoStreamInfo {
                index: stream.index,
                codec,
                width: stream.width.unwrap_or(0),
                height: stream.height.unwrap_or(0),
                frame_rate: stream
                    .r_frame_rate
                    .as_deref()
                    .and_then(|r| r.parse::<FrameRate>().ok()),
                pixel_format: stream.pix_fmt,
            }),
            Some("audio") => audio_streams.push(AudioStreamInfo {
                index: stream.index,
                codec,
                sample_rate: stream
                    .sample_rate
                    .as_deref()
                    .and_then(|r| r.parse().ok())
                    .unwrap_or(0),
                channels: stream.channels.unwrap_or(0),
            }),
            _ => {}
        }
    }

    let (format, format_duration) = match raw.format {
        Some(f) => (
            f.format_name.unwrap_or_default(),
            f.duration.as_deref().and_then(|d| d.parse::<f64>().ok()),
        ),
        None => (String::new(), None),
    };
    // Some containers only report duration per stream.
    let seconds = format_duration
        .or(stream_duration)
        .ok_or_else(|| fail("no duration reported".into()))?;
    let duration = RationalTime::try_from_seconds_f64(seconds)
        .filter(|d| d.is_positive())
        .ok_or_else(|| fail(format!("invalid duration {seconds}")))?;

    if video_streams.is_empty() && audio_streams.is_empty() {
        return Err(fail("no audio or video streams".into()));
    }

    Ok(MediaInfo {
        path: path.to_path_buf(),
        duration,
        format,
        video_streams,
        audio_streams,
    })
}
