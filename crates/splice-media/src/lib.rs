//! Splice Media - FFmpeg integration for probing and export
//!
//! This crate handles:
//! - Media file probing (ffprobe)
//! - Per-clip fragment extraction and concatenation (ffmpeg)
//! - Output encoding settings and presets
//! - The export job state machine and orchestrator

pub mod export;
pub mod probe;
pub mod settings;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tools;
pub mod transcode;

pub use export::{
    purge_stale_job_dirs, ExportCancel, ExportEvent, ExportJob, ExportOrchestrator, ExportState,
    ExportSummary, ProgressTracker,
};
pub use probe::{AudioStreamInfo, FfprobeProber, MediaInfo, MediaProber, VideoStreamInfo};
pub use settings::{AudioCodec, EncoderPreset, ExportSettings, VideoCodec};
pub use tools::ToolLocations;
pub use transcode::{CombineRequest, ExtractRequest, FfmpegTranscoder, TranscodeResult, Transcoder};
