//! In-process stand-ins for ffprobe and ffmpeg.
//!
//! Enabled with the `testing` feature. The fake transcoder writes small
//! placeholder files so callers that stat their outputs keep working.

use async_trait::async_trait;
use parking_lot::Mutex;
use splice_core::{FrameRate, RationalTime, Result, SpliceError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::probe::{AudioStreamInfo, MediaInfo, MediaProber, VideoStreamInfo};
use crate::transcode::{CombineRequest, ExtractRequest, TranscodeResult, Transcoder};

/// A plausible 1080p30 A/V file of the given length.
pub fn media_info(path: impl Into<PathBuf>, duration: RationalTime) -> MediaInfo {
    MediaInfo {
        path: path.into(),
        duration,
        format: "mov,mp4,m4a,3gp,3g2,mj2".into(),
        video_streams: vec![VideoStreamInfo {
            index: 0,
            codec: "h264".into(),
            width: 1920,
            height: 1080,
            frame_rate: Some(FrameRate::FPS_30),
            pixel_format: Some("yuv420p".into()),
        }],
        audio_streams: vec![AudioStreamInfo {
            index: 1,
            codec: "aac".into(),
            sample_rate: 48000,
            channels: 2,
        }],
    }
}

/// Prober answering from a fixed table.
#[derive(Debug, Default)]
pub struct FakeProber {
    media: Mutex<HashMap<PathBuf, MediaInfo>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an A/V file of `seconds` length.
    pub fn with_media(self, path: impl Into<PathBuf>, seconds: i64) -> Self {
        let path = path.into();
        self.insert(media_info(path, RationalTime::from_seconds(seconds)));
        self
    }

    pub fn insert(&self, info: MediaInfo) {
        self.media.lock().insert(info.path.clone(), info);
    }
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        self.media
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| SpliceError::ProbeFailed {
                path: path.to_path_buf(),
                reason: "file not found".into(),
            })
    }
}

/// A call received by [`FakeTranscoder`].
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeCall {
    Extract(ExtractRequest),
    Combine(CombineRequest),
    Snapshot {
        source: PathBuf,
        at: RationalTime,
        output: PathBuf,
    },
}

/// Transcoder that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct FakeTranscoder {
    calls: Mutex<Vec<TranscodeCall>>,
    /// Fail the extract call with this zero-based index.
    fail_extract_at: Option<usize>,
    fail_combine: bool,
    fail_snapshot: bool,
    /// Report combine success without writing the output file.
    skip_combine_output: bool,
    /// Fractions reported during combine.
    combine_progress: Vec<f64>,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self {
            combine_progress: vec![0.25, 0.5, 0.5, 1.0],
            ..Self::default()
        }
    }

    pub fn failing_extract_at(mut self, index: usize) -> Self {
        self.fail_extract_at = Some(index);
        self
    }

    pub fn failing_combine(mut self) -> Self {
        self.fail_combine = true;
        self
    }

    pub fn failing_snapshot(mut self) -> Self {
        self.fail_snapshot = true;
        self
    }

    pub fn without_combine_output(mut self) -> Self {
        self.skip_combine_output = true;
        self
    }

    pub fn with_combine_progress(mut self, fractions: Vec<f64>) -> Self {
        self.combine_progress = fractions;
        self
    }

    pub fn calls(&self) -> Vec<TranscodeCall> {
        self.calls.lock().clone()
    }

    pub fn extract_calls(&self) -> Vec<ExtractRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                TranscodeCall::Extract(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn combine_calls(&self) -> Vec<CombineRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                TranscodeCall::Combine(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }
}

async fn touch(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, b"splice-fake-media").await
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn extract(&self, request: &ExtractRequest) -> TranscodeResult {
        let index = {
            let mut calls = self.calls.lock();
            let index = calls
                .iter()
                .filter(|c| matches!(c, TranscodeCall::Extract(_)))
                .count();
            calls.push(TranscodeCall::Extract(request.clone()));
            index
        };
        if self.fail_extract_at == Some(index) {
            return TranscodeResult::Failed {
                reason: "simulated extract failure".into(),
            };
        }
        match touch(&request.output).await {
            Ok(()) => TranscodeResult::Completed {
                output: request.output.clone(),
                elapsed: Duration::from_millis(1),
            },
            Err(e) => TranscodeResult::Failed {
                reason: e.to_string(),
            },
        }
    }

    async fn combine(
        &self,
        request: &CombineRequest,
        progress: &mut (dyn FnMut(f64) + Send),
    ) -> Result<()> {
        self.calls.lock().push(TranscodeCall::Combine(request.clone()));
        for &fraction in &self.combine_progress {
            progress(fraction);
        }
        if self.fail_combine {
            return Err(SpliceError::CombineFailed {
                reason: "simulated combine failure".into(),
            });
        }
        if !self.skip_combine_output {
            touch(&request.settings.output_path).await?;
        }
        Ok(())
    }

    async fn snapshot_frame(
        &self,
        source: &Path,
        at: RationalTime,
        output: &Path,
    ) -> TranscodeResult {
        self.calls.lock().push(TranscodeCall::Snapshot {
            source: source.to_path_buf(),
            at,
            output: output.to_path_buf(),
        });
        if self.fail_snapshot {
            return TranscodeResult::Failed {
                reason: "simulated snapshot failure".into(),
            };
        }
        match touch(output).await {
            Ok(()) => TranscodeResult::Completed {
                output: output.to_path_buf(),
                elapsed: Duration::from_millis(1),
            },
            Err(e) => TranscodeResult::Failed {
                reason: e.to_string(),
            },
        }
    }
}
