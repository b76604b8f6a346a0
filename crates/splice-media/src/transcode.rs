//! External transcoder adapter.
//!
//! The editor never decodes media itself. Each clip becomes one A/V fragment
//! produced by ffmpeg, and the fragments are joined with the concat filter.

use async_trait::async_trait;
use splice_core::{RationalTime, Result, SpliceError};
use splice_timeline::TimelineSettings;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use uuid::Uuid;

use crate::settings::ExportSettings;

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 12;

/// Encoding used for intermediate fragments. Quality is kept high since the
/// fragments are encoded a second time.
const FRAGMENT_VIDEO_ARGS: [&str; 8] = [
    "-c:v", "libx264", "-preset", "veryfast", "-crf", "16", "-pix_fmt", "yuv420p",
];

/// Outcome of a single external transcode.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeResult {
    Completed { output: PathBuf, elapsed: Duration },
    Failed { reason: String },
}

impl TranscodeResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// One clip's worth of work: cut, retime, apply gain, conform to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub clip_id: Uuid,
    pub source: PathBuf,
    pub source_start: RationalTime,
    pub source_end: RationalTime,
    pub speed: f64,
    /// Linear gain, already combined with track volume and mute.
    pub gain: f32,
    /// Leading fade-in length, if the clip has a visible transition.
    pub fade_in: Option<RationalTime>,
    /// Use the source's video stream; otherwise black frames are generated.
    pub use_source_video: bool,
    /// Use the source's audio stream; otherwise silence is generated.
    pub use_source_audio: bool,
    pub canvas: TimelineSettings,
    pub output: PathBuf,
}

impl ExtractRequest {
    pub fn source_duration(&self) -> RationalTime {
        self.source_end - self.source_start
    }

    /// Length of the produced fragment once speed is applied.
    pub fn output_seconds(&self) -> f64 {
        self.source_duration().to_seconds_f64() / self.speed
    }
}

/// Join fragments, in order, into the final output.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineRequest {
    pub fragments: Vec<PathBuf>,
    pub settings: ExportSettings,
    /// Sum of fragment lengths; progress is measured against it.
    pub expected_duration: RationalTime,
}

/// The external transcoding engine.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn extract(&self, request: &ExtractRequest) -> TranscodeResult;

    /// Combine fragments. `progress` receives the completed fraction in
    /// `[0, 1]` whenever the engine reports it.
    async fn combine(
        &self,
        request: &CombineRequest,
        progress: &mut (dyn FnMut(f64) + Send),
    ) -> Result<()>;

    /// Write the frame of `source` at `at` as a still image.
    async fn snapshot_frame(&self, source: &Path, at: RationalTime, output: &Path)
        -> TranscodeResult;
}

/// [`Transcoder`] driving the ffmpeg executable.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Run ffmpeg to completion. Stderr is drained concurrently so a chatty
    /// encoder cannot block on a full pipe; when `progress` is given, stdout
    /// is read as `-progress pipe:1` output.
    async fn run(
        &self,
        args: &[String],
        mut progress: Option<(&mut (dyn FnMut(f64) + Send), f64)>,
    ) -> std::result::Result<(), String> {
        tracing::debug!(ffmpeg = %self.ffmpeg.display(), args = ?args, "Running ffmpeg");
        let mut child = tokio::process::Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(if progress.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {e}", self.ffmpeg.display()))?;

        let stderr_handle = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf).await;
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        if let (Some((callback, total_seconds)), Some(stdout)) =
            (progress.as_mut(), child.stdout.take())
        {
            let mut lines = BufReader::new(stdout).lines();
            let mut out_seconds = 0.0;
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(seconds) = parse_out_time(&line) {
                    out_seconds = seconds;
                } else if line.starts_with("progress=") {
                    callback(progress_fraction(out_seconds, *total_seconds));
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| format!("failed to wait for ffmpeg: {e}"))?;
        if status.success() {
            return Ok(());
        }
        let stderr = match stderr_handle {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };
        Err(format!("ffmpeg exited with {status}: {}", stderr_tail(&stderr)))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn extract(&self, request: &ExtractRequest) -> TranscodeResult {
        let started = Instant::now();
        match self.run(&extract_args(request), None).await {
            Ok(()) => TranscodeResult::Completed {
                output: request.output.clone(),
                elapsed: started.elapsed(),
            },
            Err(reason) => TranscodeResult::Failed { reason },
        }
    }

    async fn combine(
        &self,
        request: &CombineRequest,
        progress: &mut (dyn FnMut(f64) + Send),
    ) -> Result<()> {
        let total = request.expected_duration.to_seconds_f64();
        self.run(&combine_args(request), Some((progress, total)))
            .await
            .map_err(|reason| SpliceError::CombineFailed { reason })
    }

    async fn snapshot_frame(
        &self,
        source: &Path,
        at: RationalTime,
        output: &Path,
    ) -> TranscodeResult {
        let started = Instant::now();
        match self.run(&snapshot_args(source, at, output), None).await {
            Ok(()) => TranscodeResult::Completed {
                output: output.to_path_buf(),
                elapsed: started.elapsed(),
            },
            Err(reason) => TranscodeResult::Failed { reason },
        }
    }
}

// ── Argument builders ───────────────────────────────────────────

/// Arguments producing one conformed A/V fragment.
pub fn extract_args(request: &ExtractRequest) -> Vec<String> {
    let canvas = &request.canvas;
    let out_seconds = format!("{:.6}", request.output_seconds());
    let rate = canvas.frame_rate.to_arg_string();
    let layout = channel_layout(canvas.audio_channels);

    let mut args = strings(&["-y", "-hide_banner", "-nostdin"]);
    args.extend(strings(&["-ss", &request.source_start.to_arg_string()]));
    args.extend(strings(&["-t", &request.source_duration().to_arg_string()]));
    args.push("-i".into());
    args.push(request.source.to_string_lossy().into_owned());

    let mut next_input = 1;
    let video_input = if request.use_source_video {
        "0:v".to_string()
    } else {
        let color = format!(
            "color=c=black:s={}x{}:r={rate}",
            canvas.width, canvas.height
        );
        args.extend(strings(&["-f", "lavfi", "-t", &out_seconds, "-i", &color]));
        next_input += 1;
        format!("{}:v", next_input - 1)
    };
    let audio_input = if request.use_source_audio {
        "0:a".to_string()
    } else {
        let silence = format!("anullsrc=r={}:cl={layout}", canvas.audio_sample_rate);
        args.extend(strings(&["-f", "lavfi", "-t", &out_seconds, "-i", &silence]));
        format!("{next_input}:a")
    };

    let fade = request
        .fade_in
        .filter(|d| d.is_positive())
        .map(|d| d.to_seconds_f64().min(request.output_seconds()));
    let retimed = (request.speed - 1.0).abs() > f64::EPSILON;

    let mut video = Vec::new();
    if retimed && request.use_source_video {
        video.push(format!("setpts=PTS/{}", request.speed));
    }
    video.push(format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
        w = canvas.width,
        h = canvas.height
    ));
    video.push("setsar=1".into());
    video.push(format!("fps={rate}"));
    if let Some(d) = fade {
        video.push(format!("fade=t=in:st=0:d={d:.6}"));
    }

    let mut audio = Vec::new();
    if retimed && request.use_source_audio {
        audio.extend(atempo_chain(request.speed));
    }
    if (request.gain - 1.0).abs() > f32::EPSILON {
        audio.push(format!("volume={:.4}", request.gain));
    }
    audio.push(format!("aresample={}", canvas.audio_sample_rate));
    audio.push(format!("aformat=channel_layouts={layout}"));
    if let Some(d) = fade {
        audio.push(format!("afade=t=in:st=0:d={d:.6}"));
    }

    let graph = format!(
        "[{video_input}]{}[v];[{audio_input}]{}[a]",
        video.join(","),
        audio.join(",")
    );
    args.extend(strings(&["-filter_complex", &graph, "-map", "[v]", "-map", "[a]"]));
    args.extend(strings(&FRAGMENT_VIDEO_ARGS));
    args.extend(strings(&["-c:a", "aac", "-b:a", "256k", "-t", &out_seconds]));
    args.push(request.output.to_string_lossy().into_owned());
    args
}

/// Arguments joining fragments with the concat filter and encoding the
/// result with the caller's settings.
pub fn combine_args(request: &CombineRequest) -> Vec<String> {
    let settings = &request.settings;
    let mut args = strings(&[if settings.overwrite { "-y" } else { "-n" }, "-hide_banner", "-nostdin"]);
    for fragment in &request.fragments {
        args.push("-i".into());
        args.push(fragment.to_string_lossy().into_owned());
    }

    let n = request.fragments.len();
    let pads: String = (0..n).map(|i| format!("[{i}:v][{i}:a]")).collect();
    let graph = format!("{pads}concat=n={n}:v=1:a=1[outv][outa]");
    args.extend(strings(&["-filter_complex", &graph, "-map", "[outv]", "-map", "[outa]"]));
    args.extend(settings.encoder_args());
    args.extend(strings(&["-progress", "pipe:1", "-nostats"]));
    args.push(settings.output_path.to_string_lossy().into_owned());
    args
}

/// Arguments grabbing a single frame.
pub fn snapshot_args(source: &Path, at: RationalTime, output: &Path) -> Vec<String> {
    let mut args = strings(&["-y", "-hide_banner", "-nostdin", "-ss", &at.to_arg_string(), "-i"]);
    args.push(source.to_string_lossy().into_owned());
    args.extend(strings(&["-frames:v", "1", "-q:v", "2"]));
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Split a speed factor into `atempo` stages, each within ffmpeg's
/// accepted 0.5..=2.0 range.
pub fn atempo_chain(speed: f64) -> Vec<String> {
    let mut stages = Vec::new();
    let mut remaining = speed;
    while remaining > 2.0 {
        stages.push("atempo=2.0".to_string());
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        stages.push("atempo=0.5".to_string());
        remaining /= 0.5;
    }
    stages.push(format!("atempo={remaining:.6}"));
    stages
}

fn channel_layout(channels: u16) -> String {
    match channels {
        1 => "mono".into(),
        2 => "stereo".into(),
        6 => "5.1".into(),
        n => format!("{n}c"),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ── Progress parsing ────────────────────────────────────────────

/// Seconds from an `out_time_ms=` / `out_time_us=` progress line. Both are
/// microseconds despite the name.
pub fn parse_out_time(line: &str) -> Option<f64> {
    let line = line.trim();
    let value = line
        .strip_prefix("out_time_us=")
        .or_else(|| line.strip_prefix("out_time_ms="))?;
    let micros: i64 = value.trim().parse().ok()?;
    Some(micros.max(0) as f64 / 1_000_000.0)
}

/// Completed fraction, clamped to `[0, 1]`.
pub fn progress_fraction(out_seconds: f64, total_seconds: f64) -> f64 {
    if total_seconds <= 0.0 || !out_seconds.is_finite() {
        return 0.0;
    }
    (out_seconds / total_seconds).clamp(0.0, 1.0)
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
