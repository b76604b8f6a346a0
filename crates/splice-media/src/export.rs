//! Export pipeline: validated timeline in, one media file out.
//!
//! A job walks `Queued → Validating → ProcessingClips → Combining →
//! Complete`, or drops to `Failed` from any non-terminal state. Clips are
//! extracted one at a time into a private job directory, then joined in a
//! single combine step.

use serde::{Deserialize, Serialize};
use splice_core::{RationalTime, Result, SpliceError, TrackKind};
use splice_timeline::TimelineSnapshot;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use uuid::Uuid;

use crate::settings::ExportSettings;
use crate::transcode::{CombineRequest, ExtractRequest, TranscodeResult, Transcoder};

/// Share of the progress bar spent on fragment extraction.
const EXTRACT_SHARE: f64 = 70.0;

const JOB_DIR_PREFIX: &str = "export-";

// ── Job state ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportState {
    Queued,
    Validating,
    ProcessingClips,
    Combining,
    Complete,
    Failed,
}

impl ExportState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Whether `self → next` is a legal step.
    pub fn can_advance_to(self, next: ExportState) -> bool {
        use ExportState::*;
        match (self, next) {
            (Queued, Validating)
            | (Validating, ProcessingClips)
            | (ProcessingClips, Combining)
            | (Combining, Complete) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Validating => "validating",
            Self::ProcessingClips => "processing-clips",
            Self::Combining => "combining",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle for cancelling an in-progress export.
///
/// Cancellation is cooperative: a running transcoder call finishes, and the
/// job stops before the next one starts.
#[derive(Debug, Clone)]
pub struct ExportCancel(Arc<AtomicBool>);

impl ExportCancel {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(SpliceError::Cancelled);
        }
        Ok(())
    }
}

impl Default for ExportCancel {
    fn default() -> Self {
        Self::new()
    }
}

/// One export of one timeline. Runs at most once.
#[derive(Debug, Clone)]
pub struct ExportJob {
    id: Uuid,
    settings: ExportSettings,
    state: ExportState,
    failure: Option<String>,
    cancel: ExportCancel,
}

impl ExportJob {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings,
            state: ExportState::Queued,
            failure: None,
            cancel: ExportCancel::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Message of the error that failed the job.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// A handle that can cancel this job from elsewhere.
    pub fn cancel_handle(&self) -> ExportCancel {
        self.cancel.clone()
    }

    /// Move to `next`, rejecting steps the state machine does not allow.
    pub fn advance(&mut self, next: ExportState) -> Result<ExportState> {
        if !self.state.can_advance_to(next) {
            return Err(SpliceError::InvalidJobState {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        let previous = self.state;
        self.state = next;
        tracing::debug!(job_id = %self.id, from = %previous, to = %next, "Export state changed");
        Ok(previous)
    }
}

// ── Events ──────────────────────────────────────────────────────

/// What a finished export produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub job_id: Uuid,
    pub output_path: PathBuf,
    pub duration: RationalTime,
    pub file_size: u64,
    pub processing_time: Duration,
    pub clip_count: usize,
    pub track_count: usize,
}

/// Lifecycle notifications of one export job, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    /// Validation passed and work is about to begin.
    Start {
        job_id: Uuid,
        track_count: usize,
        clip_count: usize,
    },
    StateChanged {
        job_id: Uuid,
        from: ExportState,
        to: ExportState,
    },
    /// Strictly increasing within a job, ending at 100.
    Progress { job_id: Uuid, percent: f64 },
    Complete(ExportSummary),
    Error { job_id: Uuid, message: String },
}

/// Keeps progress strictly increasing and in `[0, 100]`.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    last: Option<f64>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value to publish, or `None` if it would not advance.
    pub fn advance(&mut self, percent: f64) -> Option<f64> {
        let percent = percent.clamp(0.0, 100.0);
        match self.last {
            Some(last) if percent <= last => None,
            _ => {
                self.last = Some(percent);
                Some(percent)
            }
        }
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

/// Percent reached once `done` of `total` fragments exist.
pub fn extraction_percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return EXTRACT_SHARE;
    }
    EXTRACT_SHARE * done as f64 / total as f64
}

/// Percent for a combine step that is `fraction` complete.
pub fn combine_percent(fraction: f64) -> f64 {
    EXTRACT_SHARE + (100.0 - EXTRACT_SHARE) * fraction.clamp(0.0, 1.0)
}

// ── Orchestrator ────────────────────────────────────────────────

/// Runs export jobs against a [`Transcoder`].
#[derive(Clone)]
pub struct ExportOrchestrator {
    transcoder: Arc<dyn Transcoder>,
    temp_root: PathBuf,
    keep_failed_job_dirs: bool,
}

struct JobContext<'a> {
    job_id: Uuid,
    progress: ProgressTracker,
    on_event: &'a mut (dyn FnMut(ExportEvent) + Send),
}

impl JobContext<'_> {
    fn emit(&mut self, event: ExportEvent) {
        (self.on_event)(event);
    }

    fn progress(&mut self, percent: f64) {
        if let Some(percent) = self.progress.advance(percent) {
            tracing::trace!(job_id = %self.job_id, percent, "Export progress");
            let job_id = self.job_id;
            self.emit(ExportEvent::Progress { job_id, percent });
        }
    }

    fn advance(&mut self, job: &mut ExportJob, next: ExportState) -> Result<()> {
        let from = job.advance(next)?;
        let job_id = self.job_id;
        self.emit(ExportEvent::StateChanged {
            job_id,
            from,
            to: next,
        });
        Ok(())
    }
}

impl ExportOrchestrator {
    pub fn new(transcoder: Arc<dyn Transcoder>, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            temp_root: temp_root.into(),
            keep_failed_job_dirs: true,
        }
    }

    /// Keep the fragment directory of a failed job for diagnostics.
    pub fn keep_failed_job_dirs(mut self, keep: bool) -> Self {
        self.keep_failed_job_dirs = keep;
        self
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Private working directory of a job.
    pub fn job_dir(&self, job_id: Uuid) -> PathBuf {
        self.temp_root.join(format!("{JOB_DIR_PREFIX}{job_id}"))
    }

    /// Export `timeline` as described by `job`.
    ///
    /// Every failure moves the job to `Failed`, emits `Error`, and is
    /// returned. Nothing is written to the output path unless validation
    /// passed.
    pub async fn run(
        &self,
        job: &mut ExportJob,
        timeline: &TimelineSnapshot,
        on_event: &mut (dyn FnMut(ExportEvent) + Send),
    ) -> Result<ExportSummary> {
        let started = Instant::now();
        let mut ctx = JobContext {
            job_id: job.id(),
            progress: ProgressTracker::new(),
            on_event,
        };

        // A job that has already run is not restarted.
        ctx.advance(job, ExportState::Validating)?;

        let validated = job
            .settings()
            .validate()
            .and_then(|()| timeline.validate().map_err(SpliceError::from));
        if let Err(e) = validated {
            return Err(self.fail(job, &mut ctx, e));
        }

        let track_count = timeline.tracks().len();
        let clip_count = timeline.clip_count();
        let job_id = job.id();
        tracing::info!(
            job_id = %job_id,
            output = %job.settings().output_path.display(),
            track_count,
            clip_count,
            "Export started"
        );
        ctx.emit(ExportEvent::Start {
            job_id,
            track_count,
            clip_count,
        });
        ctx.progress(0.0);

        let dir = self.job_dir(job_id);
        let result = match tokio::fs::create_dir_all(&dir).await {
            Ok(()) => self.render(job, timeline, &dir, &mut ctx).await,
            Err(e) => Err(SpliceError::Io(e)),
        };

        match result {
            Ok(()) => {
                ctx.progress(100.0);
                if let Err(e) = ctx.advance(job, ExportState::Complete) {
                    return Err(self.fail(job, &mut ctx, e));
                }
                remove_dir_best_effort(&dir).await;

                let output_path = job.settings().output_path.clone();
                let file_size = output_size(&output_path).await;
                let summary = ExportSummary {
                    job_id,
                    output_path,
                    duration: timeline.duration(),
                    file_size,
                    processing_time: started.elapsed(),
                    clip_count,
                    track_count,
                };
                tracing::info!(
                    job_id = %job_id,
                    file_size,
                    elapsed_ms = summary.processing_time.as_millis() as u64,
                    "Export complete"
                );
                ctx.emit(ExportEvent::Complete(summary.clone()));
                Ok(summary)
            }
            Err(e) => {
                if self.keep_failed_job_dirs {
                    tracing::info!(job_id = %job_id, dir = %dir.display(), "Keeping failed job directory");
                } else {
                    remove_dir_best_effort(&dir).await;
                }
                Err(self.fail(job, &mut ctx, e))
            }
        }
    }

    async fn render(
        &self,
        job: &mut ExportJob,
        timeline: &TimelineSnapshot,
        dir: &Path,
        ctx: &mut JobContext<'_>,
    ) -> Result<()> {
        ctx.advance(job, ExportState::ProcessingClips)?;
        let cancel = job.cancel_handle();
        let total = timeline.clip_count();
        let mut fragments = Vec::with_capacity(total);
        let mut expected_seconds = 0.0;

        for (index, (track, clip)) in timeline.export_order().enumerate() {
            cancel.check()?;
            let request = ExtractRequest {
                clip_id: clip.id,
                source: clip.source.path.clone(),
                source_start: clip.source_start(),
                source_end: clip.source_end(),
                speed: clip.speed(),
                gain: track.effective_gain(clip),
                fade_in: clip
                    .transition
                    .filter(|t| t.is_visible())
                    .map(|t| t.duration),
                use_source_video: clip.source.has_video && track.kind() != TrackKind::Audio,
                use_source_audio: clip.source.has_audio,
                canvas: timeline.settings().clone(),
                output: dir.join(format!("fragment-{index:04}.mkv")),
            };
            tracing::debug!(
                job_id = %ctx.job_id,
                clip_id = %clip.id,
                index,
                total,
                "Extracting clip"
            );
            match self.transcoder.extract(&request).await {
                TranscodeResult::Completed { output, elapsed } => {
                    tracing::debug!(clip_id = %clip.id, elapsed_ms = elapsed.as_millis() as u64, "Fragment ready");
                    expected_seconds += request.output_seconds();
                    fragments.push(output);
                }
                TranscodeResult::Failed { reason } => {
                    return Err(SpliceError::TranscodeFailed {
                        clip_id: clip.id,
                        reason,
                    });
                }
            }
            ctx.progress(extraction_percent(index + 1, total));
        }

        cancel.check()?;
        ctx.advance(job, ExportState::Combining)?;
        let request = CombineRequest {
            fragments,
            settings: job.settings().clone(),
            expected_duration: RationalTime::from_seconds_f64(expected_seconds),
        };
        if let Some(parent) = request.settings.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut on_fraction = |fraction: f64| ctx.progress(combine_percent(fraction));
        self.transcoder.combine(&request, &mut on_fraction).await
    }

    fn fail(&self, job: &mut ExportJob, ctx: &mut JobContext<'_>, error: SpliceError) -> SpliceError {
        if let Err(e) = ctx.advance(job, ExportState::Failed) {
            tracing::warn!(job_id = %ctx.job_id, error = %e, "Could not mark job failed");
        }
        let message = error.to_string();
        tracing::error!(job_id = %ctx.job_id, error = %message, "Export failed");
        job.failure = Some(message.clone());
        let job_id = ctx.job_id;
        ctx.emit(ExportEvent::Error { job_id, message });
        error
    }
}

async fn remove_dir_best_effort(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        tracing::warn!(dir = %dir.display(), error = %e, "Failed to remove job directory");
    }
}

/// Size of the finished output. A failed stat is logged and reported as 0
/// since the job itself already succeeded.
async fn output_size(path: &Path) -> u64 {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to stat export output");
            0
        }
    }
}

/// Remove job directories under `root` older than `max_age`, returning how
/// many were deleted. Entries that cannot be inspected or removed are
/// skipped.
pub fn purge_stale_job_dirs(root: &Path, max_age: Duration) -> Result<usize> {
    if !root.exists() {
        return Ok(0);
    }
    let now = SystemTime::now();
    let mut removed = 0;
    for entry in std::fs::read_dir(root)? {
        let Ok(entry) = entry else { continue };
        let is_job_dir = entry.file_name().to_string_lossy().starts_with(JOB_DIR_PREFIX)
            && entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_job_dir {
            continue;
        }
        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if age.is_some_and(|age| age >= max_age) {
            match std::fs::remove_dir_all(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(dir = %entry.path().display(), error = %e, "Failed to purge job directory");
                }
            }
        }
    }
    if removed > 0 {
        tracing::info!(root = %root.display(), removed, "Purged stale export directories");
    }
    Ok(removed)
}
