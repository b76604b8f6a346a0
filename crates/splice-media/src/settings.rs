//! Output encoding settings and presets.

use serde::{Deserialize, Serialize};
use splice_core::{Result, SpliceError};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    H265,
    ProRes,
    Vp9,
    Av1,
}

impl VideoCodec {
    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::H265 => "libx265",
            Self::ProRes => "prores_ks",
            Self::Vp9 => "libvpx-vp9",
            Self::Av1 => "libaom-av1",
        }
    }

    /// Whether the encoder understands `-preset`.
    pub fn has_speed_presets(self) -> bool {
        matches!(self, Self::H264 | Self::H265)
    }

    /// Whether the encoder understands `-crf`.
    pub fn supports_crf(self) -> bool {
        !matches!(self, Self::ProRes)
    }
}

impl FromStr for VideoCodec {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "h264" | "libx264" => Ok(Self::H264),
            "h265" | "hevc" | "libx265" => Ok(Self::H265),
            "prores" => Ok(Self::ProRes),
            "vp9" => Ok(Self::Vp9),
            "av1" => Ok(Self::Av1),
            other => Err(SpliceError::InvalidParameter(format!(
                "unknown video codec '{other}'"
            ))),
        }
    }
}

/// Audio codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Aac,
    Pcm,
    Flac,
    Opus,
}

impl AudioCodec {
    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Pcm => "pcm_s16le",
            Self::Flac => "flac",
            Self::Opus => "libopus",
        }
    }

    /// Lossless codecs ignore a target bitrate.
    pub fn is_lossless(self) -> bool {
        matches!(self, Self::Pcm | Self::Flac)
    }
}

impl FromStr for AudioCodec {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aac" => Ok(Self::Aac),
            "pcm" => Ok(Self::Pcm),
            "flac" => Ok(Self::Flac),
            "opus" => Ok(Self::Opus),
            other => Err(SpliceError::InvalidParameter(format!(
                "unknown audio codec '{other}'"
            ))),
        }
    }
}

/// x264/x265 speed preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl EncoderPreset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Slower => "slower",
            Self::Veryslow => "veryslow",
        }
    }
}

impl fmt::Display for EncoderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest CRF accepted by x264/x265.
pub const MAX_CRF: u8 = 51;

/// Where and how the combined output is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub output_path: PathBuf,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    pub preset: EncoderPreset,
    /// Constant rate factor, 0-51, lower is better.
    pub crf: u8,
    pub audio_bitrate_kbps: u32,
    /// Replace an existing file at `output_path`.
    pub overwrite: bool,
}

impl ExportSettings {
    /// H.264/AAC, medium preset, CRF 23, 192 kbps.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::Aac,
            preset: EncoderPreset::Medium,
            crf: 23,
            audio_bitrate_kbps: 192,
            overwrite: true,
        }
    }

    /// H.265, slow preset, CRF 18, 256 kbps.
    pub fn high_quality(output_path: impl Into<PathBuf>) -> Self {
        Self {
            video_codec: VideoCodec::H265,
            preset: EncoderPreset::Slow,
            crf: 18,
            audio_bitrate_kbps: 256,
            ..Self::new(output_path)
        }
    }

    /// Fast encode for vertical social clips.
    pub fn social_media(output_path: impl Into<PathBuf>) -> Self {
        Self {
            preset: EncoderPreset::Fast,
            crf: 23,
            audio_bitrate_kbps: 128,
            ..Self::new(output_path)
        }
    }

    /// Lecture recordings: sharper than the default, same speed.
    pub fn course(output_path: impl Into<PathBuf>) -> Self {
        Self {
            crf: 20,
            ..Self::new(output_path)
        }
    }

    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// Same settings, different destination.
    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.crf > MAX_CRF {
            return Err(SpliceError::InvalidParameter(format!(
                "crf must be within 0..={MAX_CRF}, got {}",
                self.crf
            )));
        }
        if self.audio_bitrate_kbps == 0 && !self.audio_codec.is_lossless() {
            return Err(SpliceError::InvalidParameter(
                "audio bitrate must be positive".into(),
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(SpliceError::InvalidParameter(
                "output path is empty".into(),
            ));
        }
        Ok(())
    }

    /// Encoder arguments for the final output, without inputs or the output
    /// path.
    pub fn encoder_args(&self) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), self.video_codec.ffmpeg_encoder().to_string()];
        if self.video_codec.has_speed_presets() {
            args.extend(["-preset".to_string(), self.preset.as_str().to_string()]);
        }
        if self.video_codec.supports_crf() {
            args.extend(["-crf".into(), self.crf.to_string()]);
        }
        match self.video_codec {
            // libvpx only honours CRF in constant-quality mode.
            VideoCodec::Vp9 | VideoCodec::Av1 => args.extend(["-b:v".to_string(), "0".to_string()]),
            VideoCodec::ProRes => args.extend(["-profile:v".to_string(), "2".to_string()]),
            VideoCodec::H264 | VideoCodec::H265 => {
                args.extend(["-pix_fmt".to_string(), "yuv420p".to_string()])
            }
        }

        args.extend(["-c:a".to_string(), self.audio_codec.ffmpeg_encoder().to_string()]);
        if !self.audio_codec.is_lossless() {
            args.extend(["-b:a".into(), format!("{}k", self.audio_bitrate_kbps)]);
        }
        args
    }
}
