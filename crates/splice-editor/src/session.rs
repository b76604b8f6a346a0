//! The editor session: one timeline, its history, and its collaborators.
//!
//! Every successful edit records the previous state for undo and publishes
//! one event. Failed edits change nothing and publish nothing.

use splice_core::{
    EditorConfig, RationalTime, Result, SpliceError, TrackKind, ValidationError,
};
use splice_media::{
    purge_stale_job_dirs, ExportEvent, ExportJob, ExportOrchestrator, ExportSettings,
    ExportSummary, FfmpegTranscoder, FfprobeProber, MediaProber, ToolLocations, TranscodeResult,
    Transcoder,
};
use splice_timeline::{
    ClipOptions, ClipSource, History, Timeline, TimelineFile, TimelineSnapshot, TrackOptions,
    Transition, TrimOptions,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::events::{
    ClipAdded, ClipMoved, ClipMovedToTrack, ClipRemoved, ClipSplit, ClipTrimmed, EventBus,
    ExportCompleted, ExportFailed, ExportProgress, ExportStarted, PreviewCompleted, PreviewFailed,
    PreviewStarted, TimelineCleared, TimelineLoaded, TrackAdded, TrackRemoved, TransitionApplied,
};
use crate::presets::EditorPreset;

/// A single-writer editing session.
pub struct EditorSession {
    timeline: Timeline,
    history: History,
    events: EventBus,
    prober: Arc<dyn MediaProber>,
    transcoder: Arc<dyn Transcoder>,
    config: EditorConfig,
    preset: EditorPreset,
}

impl EditorSession {
    /// Create a session with explicit collaborators.
    pub fn new(
        config: EditorConfig,
        prober: Arc<dyn MediaProber>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self::from_preset(EditorPreset::Basic, config, prober, transcoder)
    }

    /// Create a session whose canvas and default export follow `preset`.
    pub fn from_preset(
        preset: EditorPreset,
        config: EditorConfig,
        prober: Arc<dyn MediaProber>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let timeline = Timeline::new(preset.timeline_settings(&config.timeline));
        Self {
            timeline,
            history: History::new(config.history_depth),
            events: EventBus::new(),
            prober,
            transcoder,
            config,
            preset,
        }
    }

    /// Create a session backed by the ffprobe/ffmpeg executables.
    pub fn with_ffmpeg(config: EditorConfig, preset: EditorPreset) -> Self {
        let tools = ToolLocations::resolve(&config.tools);
        let prober = Arc::new(FfprobeProber::new(tools.ffprobe));
        let transcoder = Arc::new(FfmpegTranscoder::new(tools.ffmpeg));
        Self::from_preset(preset, config, prober, transcoder)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn preset(&self) -> EditorPreset {
        self.preset
    }

    /// Immutable copy of the current timeline.
    pub fn get_timeline(&self) -> TimelineSnapshot {
        self.timeline.snapshot()
    }

    /// Apply `op`, recording the previous state only if it succeeds.
    fn edit<T>(&mut self, op: impl FnOnce(&mut Timeline) -> Result<T>) -> Result<T> {
        let before = self.timeline.snapshot();
        let out = op(&mut self.timeline)?;
        self.history.record(before);
        Ok(out)
    }

    // ── Tracks ──────────────────────────────────────────────────

    pub fn add_track(&mut self, kind: TrackKind, options: TrackOptions) -> Result<Uuid> {
        let track_id = self.edit(|t| t.add_track(kind, options))?;
        self.events.publish(TrackAdded { track_id, kind });
        Ok(track_id)
    }

    pub fn remove_track(&mut self, track_id: Uuid) -> Result<()> {
        self.edit(|t| t.remove_track(track_id))?;
        self.events.publish(TrackRemoved { track_id });
        Ok(())
    }

    pub fn set_track_locked(&mut self, track_id: Uuid, locked: bool) -> Result<()> {
        self.edit(|t| {
            t.track_mut(track_id)?.locked = locked;
            Ok(())
        })
    }

    pub fn set_track_muted(&mut self, track_id: Uuid, muted: bool) -> Result<()> {
        self.edit(|t| {
            t.track_mut(track_id)?.muted = muted;
            Ok(())
        })
    }

    pub fn set_track_volume(&mut self, track_id: Uuid, volume: f32) -> Result<()> {
        self.edit(|t| t.track_mut(track_id)?.set_volume(volume))
    }

    // ── Clips ───────────────────────────────────────────────────

    /// Probe `path` and place it on a track.
    pub async fn add_clip(
        &mut self,
        track_id: Uuid,
        path: impl AsRef<Path>,
        options: ClipOptions,
    ) -> Result<Uuid> {
        let path = path.as_ref();
        // Fail before probing when the clip could not be placed anyway.
        self.timeline.track(track_id)?.ensure_unlocked()?;

        let info = self.prober.probe(path).await?;
        let source = ClipSource::new(path, info.duration)
            .with_streams(info.has_video(), info.has_audio());
        let clip_id = self.edit(|t| t.add_clip(track_id, source, options))?;
        tracing::info!(track_id = %track_id, clip_id = %clip_id, path = %path.display(), "Clip added");
        self.events.publish(ClipAdded { track_id, clip_id });
        Ok(clip_id)
    }

    pub fn remove_clip(&mut self, track_id: Uuid, clip_id: Uuid) -> Result<()> {
        self.edit(|t| t.remove_clip(track_id, clip_id))?;
        self.events.publish(ClipRemoved { track_id, clip_id });
        Ok(())
    }

    pub fn trim_clip(&mut self, track_id: Uuid, clip_id: Uuid, options: TrimOptions) -> Result<()> {
        let outcome = self.edit(|t| t.trim_clip(track_id, clip_id, options))?;
        self.events.publish(ClipTrimmed {
            track_id,
            clip_id,
            old_duration: outcome.old_duration,
            new_duration: outcome.new_duration,
        });
        Ok(())
    }

    /// Split a clip `offset` after its start. Returns the ids of the two
    /// replacement clips.
    pub fn split_clip(
        &mut self,
        track_id: Uuid,
        clip_id: Uuid,
        offset: RationalTime,
    ) -> Result<(Uuid, Uuid)> {
        let outcome = self.edit(|t| t.split_clip(track_id, clip_id, offset))?;
        self.events.publish(ClipSplit {
            track_id,
            original_clip_id: clip_id,
            first_clip_id: outcome.first,
            second_clip_id: outcome.second,
        });
        Ok((outcome.first, outcome.second))
    }

    pub fn move_clip(&mut self, track_id: Uuid, clip_id: Uuid, new_start: RationalTime) -> Result<()> {
        let old_start = self.edit(|t| t.move_clip(track_id, clip_id, new_start))?;
        self.events.publish(ClipMoved {
            track_id,
            clip_id,
            old_start,
            new_start,
        });
        Ok(())
    }

    pub fn move_clip_to_track(
        &mut self,
        from_track_id: Uuid,
        to_track_id: Uuid,
        clip_id: Uuid,
    ) -> Result<()> {
        self.edit(|t| t.move_clip_to_track(from_track_id, to_track_id, clip_id))?;
        self.events.publish(ClipMovedToTrack {
            from_track_id,
            to_track_id,
            clip_id,
        });
        Ok(())
    }

    pub fn apply_transition(
        &mut self,
        track_id: Uuid,
        clip_id: Uuid,
        transition: Transition,
    ) -> Result<()> {
        self.edit(|t| t.apply_transition(track_id, clip_id, transition))?;
        self.events.publish(TransitionApplied {
            track_id,
            clip_id,
            kind: transition.kind,
            duration: transition.duration,
        });
        Ok(())
    }

    // ── Whole timeline ──────────────────────────────────────────

    /// Replace the timeline wholesale. Undoable.
    pub fn load_timeline(&mut self, snapshot: TimelineSnapshot) -> Result<()> {
        self.edit(|t| t.load(snapshot))?;
        self.publish_loaded();
        Ok(())
    }

    /// Remove every track. Undoable.
    pub fn clear(&mut self) {
        let before = self.timeline.snapshot();
        self.timeline.clear();
        self.history.record(before);
        self.events.publish(TimelineCleared);
    }

    fn publish_loaded(&self) {
        self.events.publish(TimelineLoaded {
            track_count: self.timeline.tracks().len(),
            clip_count: self.timeline.clip_count(),
        });
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(previous) = self.history.undo(self.timeline.snapshot()) else {
            return Ok(false);
        };
        if let Err(e) = self.timeline.load(previous.clone()) {
            self.history.revert_undo(previous);
            return Err(e);
        }
        self.publish_loaded();
        Ok(true)
    }

    /// Re-apply the last undone edit. Returns `false` when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(next) = self.history.redo(self.timeline.snapshot()) else {
            return Ok(false);
        };
        if let Err(e) = self.timeline.load(next.clone()) {
            self.history.revert_redo(next);
            return Err(e);
        }
        self.publish_loaded();
        Ok(true)
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.timeline.validate()
    }

    // ── Persistence ─────────────────────────────────────────────

    pub fn save(&self, path: &Path) -> Result<()> {
        TimelineFile::new(self.timeline.snapshot()).save_to_file(path)
    }

    /// Load a timeline file into this session. Undoable.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let file = TimelineFile::load_from_file(path)?;
        tracing::info!(path = %path.display(), version = file.version, "Opening timeline");
        self.load_timeline(file.timeline)
    }

    // ── Export ──────────────────────────────────────────────────

    /// Export settings of this session's preset, writing to `output_path`.
    pub fn default_export_settings(&self, output_path: impl Into<PathBuf>) -> ExportSettings {
        self.preset.export_settings(output_path)
    }

    /// Export the current timeline with `settings`.
    pub async fn export(&self, settings: ExportSettings) -> Result<ExportSummary> {
        let mut job = ExportJob::new(settings);
        self.export_job(&mut job).await
    }

    /// Run a prepared job. Use [`ExportJob::cancel_handle`] to cancel it
    /// from another task.
    pub async fn export_job(&self, job: &mut ExportJob) -> Result<ExportSummary> {
        let snapshot = self.timeline.snapshot();
        let orchestrator = ExportOrchestrator::new(self.transcoder.clone(), &self.config.temp_dir)
            .keep_failed_job_dirs(self.config.export.keep_failed_job_dirs);
        let events = &self.events;
        let mut forward = |event: ExportEvent| match event {
            ExportEvent::Start {
                job_id,
                track_count,
                clip_count,
            } => events.publish(ExportStarted {
                job_id,
                track_count,
                clip_count,
            }),
            ExportEvent::Progress { job_id, percent } => {
                events.publish(ExportProgress { job_id, percent })
            }
            ExportEvent::Complete(summary) => events.publish(ExportCompleted { summary }),
            ExportEvent::Error { job_id, message } => events.publish(ExportFailed { job_id, message }),
            ExportEvent::StateChanged { .. } => {}
        };
        orchestrator.run(job, &snapshot, &mut forward).await
    }

    /// Remove export directories left behind by jobs older than `max_age`.
    pub fn purge_stale_exports(&self, max_age: Duration) -> Result<usize> {
        purge_stale_job_dirs(&self.config.temp_dir, max_age)
    }

    // ── Preview ─────────────────────────────────────────────────

    /// Render the frame shown at timeline time `at` to an image.
    ///
    /// The first track (in order) with a video clip covering `at` wins.
    /// Without `output`, the image goes to
    /// `<temp_dir>/previews/preview-<ms>.jpg`.
    pub async fn generate_preview(
        &self,
        at: RationalTime,
        output: Option<PathBuf>,
    ) -> Result<PathBuf> {
        self.events.publish(PreviewStarted { at });
        match self.render_preview(at, output).await {
            Ok(path) => {
                self.events.publish(PreviewCompleted {
                    at,
                    path: path.clone(),
                });
                Ok(path)
            }
            Err(e) => {
                tracing::warn!(at = %at, error = %e, "Preview failed");
                self.events.publish(PreviewFailed {
                    at,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn render_preview(&self, at: RationalTime, output: Option<PathBuf>) -> Result<PathBuf> {
        let (clip, source_time) = self
            .timeline
            .tracks()
            .iter()
            .filter(|t| t.kind() != TrackKind::Audio)
            .filter_map(|t| t.clip_at(at))
            .filter(|c| c.source.has_video)
            .find_map(|c| c.source_time_at(at).map(|s| (c, s)))
            .ok_or_else(|| SpliceError::Preview(format!("no video clip at {at}")))?;

        let output = match output {
            Some(path) => path,
            None => {
                let millis = at.to_millis();
                self.config
                    .temp_dir
                    .join("previews")
                    .join(format!("preview-{millis}.jpg"))
            }
        };
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        match self
            .transcoder
            .snapshot_frame(&clip.source.path, source_time, &output)
            .await
        {
            TranscodeResult::Completed { output, .. } => Ok(output),
            TranscodeResult::Failed { reason } => Err(SpliceError::Preview(reason)),
        }
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("preset", &self.preset)
            .field("tracks", &self.timeline.tracks().len())
            .field("clips", &self.timeline.clip_count())
            .field("undo", &self.history.undo_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EditorEvent, EventPayload};
    use splice_media::testing::{FakeProber, FakeTranscoder};
    use splice_timeline::TransitionKind;

    fn secs(s: i64) -> RationalTime {
        RationalTime::from_seconds(s)
    }

    fn session_in(dir: &Path) -> (EditorSession, Arc<FakeTranscoder>) {
        let config = EditorConfig {
            temp_dir: dir.to_path_buf(),
            ..EditorConfig::default()
        };
        let prober = Arc::new(
            FakeProber::new()
                .with_media("a.mp4", 10)
                .with_media("b.mp4", 6)
                .with_media("c.mp4", 4),
        );
        let transcoder = Arc::new(FakeTranscoder::new());
        (
            EditorSession::new(config, prober, transcoder.clone()),
            transcoder,
        )
    }

    fn names(rx: &crossbeam_channel::Receiver<EditorEvent>) -> Vec<&'static str> {
        rx.try_iter().map(|e| e.name()).collect()
    }

    #[tokio::test]
    async fn test_add_clip_probes_source() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        let clip_id = session
            .add_clip(track, "a.mp4", ClipOptions::default())
            .await
            .unwrap();

        let snapshot = session.get_timeline();
        let clip = snapshot.track(track).unwrap().find_clip(clip_id).unwrap();
        assert_eq!(clip.source_start(), secs(0));
        assert_eq!(clip.source_end(), secs(10));
        assert_eq!(clip.duration(), secs(10));
        assert_eq!(clip.timeline_start(), secs(0));
        assert_eq!(clip.timeline_end(), secs(10));
    }

    #[tokio::test]
    async fn test_probe_failure_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        let rx = session.events().channel();
        let result = session
            .add_clip(track, "missing.mp4", ClipOptions::default())
            .await;
        assert!(matches!(result, Err(SpliceError::ProbeFailed { .. })));
        assert_eq!(session.timeline().clip_count(), 0);
        assert!(names(&rx).is_empty());
    }

    #[tokio::test]
    async fn test_every_edit_publishes_one_event() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_in(dir.path());
        let rx = session.events().channel();

        let video = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        let both = session
            .add_track(TrackKind::Both, TrackOptions::default())
            .unwrap();
        let clip = session
            .add_clip(video, "a.mp4", ClipOptions::default())
            .await
            .unwrap();
        session
            .trim_clip(
                video,
                clip,
                TrimOptions {
                    end: Some(secs(8)),
                    ..Default::default()
                },
            )
            .unwrap();
        let (first, second) = session.split_clip(video, clip, secs(3)).unwrap();
        session.move_clip(video, second, secs(20)).unwrap();
        session.move_clip_to_track(video, both, first).unwrap();
        session
            .apply_transition(both, first, Transition::new(TransitionKind::Fade, secs(1)))
            .unwrap();
        session.remove_clip(both, first).unwrap();
        let saved = session.get_timeline();
        session.remove_track(video).unwrap();
        session.clear();
        session.load_timeline(saved).unwrap();

        assert_eq!(
            names(&rx),
            vec![
                "track-added",
                "track-added",
                "clip-added",
                "clip-trimmed",
                "clip-split",
                "clip-moved",
                "clip-moved-to-track",
                "transition-applied",
                "clip-removed",
                "track-removed",
                "timeline-cleared",
                "timeline-loaded",
            ]
        );
        assert_eq!(session.timeline().tracks().len(), 2);
        assert_eq!(session.timeline().clip_count(), 1);
    }

    #[tokio::test]
    async fn test_typed_split_event_carries_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_in(dir.path());
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let sink = seen.clone();
        session
            .events()
            .subscribe::<ClipSplit, _>(move |e| *sink.lock() = Some(e.clone()));

        let track = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        let clip = session
            .add_clip(track, "a.mp4", ClipOptions::default())
            .await
            .unwrap();
        let (first, second) = session.split_clip(track, clip, secs(4)).unwrap();

        let event = seen.lock().clone().unwrap();
        assert_eq!(event.original_clip_id, clip);
        assert_eq!((event.first_clip_id, event.second_clip_id), (first, second));
        assert_eq!(ClipSplit::NAME, "clip-split");
    }

    #[tokio::test]
    async fn test_undo_redo() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        let clip = session
            .add_clip(track, "a.mp4", ClipOptions::default())
            .await
            .unwrap();
        let before_split = session.get_timeline();
        session.split_clip(track, clip, secs(5)).unwrap();
        let after_split = session.get_timeline();

        let rx = session.events().channel();
        assert!(session.undo().unwrap());
        assert_eq!(session.get_timeline(), before_split);
        assert!(session.redo().unwrap());
        assert_eq!(session.get_timeline(), after_split);
        assert_eq!(names(&rx), vec!["timeline-loaded", "timeline-loaded"]);

        // Failed edits are not recorded.
        assert!(session.split_clip(track, clip, secs(5)).is_err());
        assert!(session.undo().unwrap());
        assert_eq!(session.get_timeline(), before_split);
    }

    #[tokio::test]
    async fn test_clear_is_undoable() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Audio, TrackOptions::default())
            .unwrap();
        session
            .add_clip(track, "b.mp4", ClipOptions::default())
            .await
            .unwrap();
        session.clear();
        assert_eq!(session.timeline().clip_count(), 0);
        session.undo().unwrap();
        assert_eq!(session.timeline().clip_count(), 1);
    }

    #[tokio::test]
    async fn test_locked_track_rejects_add_before_probe() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        session.set_track_locked(track, true).unwrap();
        let result = session
            .add_clip(track, "missing.mp4", ClipOptions::default())
            .await;
        assert!(matches!(result, Err(SpliceError::TrackLocked { .. })));
    }

    #[tokio::test]
    async fn test_export_publishes_progress_then_complete() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, transcoder) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        for file in ["a.mp4", "b.mp4", "c.mp4"] {
            session
                .add_clip(track, file, ClipOptions::default())
                .await
                .unwrap();
        }
        let rx = session.events().channel();
        let summary = session
            .export(session.default_export_settings(dir.path().join("out.mp4")))
            .await
            .unwrap();

        assert_eq!((summary.clip_count, summary.track_count), (3, 1));
        assert_eq!(transcoder.extract_calls().len(), 3);
        assert_eq!(transcoder.combine_calls().len(), 1);

        let events: Vec<EditorEvent> = rx.try_iter().collect();
        assert_eq!(events.first().map(EditorEvent::name), Some("export-start"));
        assert_eq!(events.last().map(EditorEvent::name), Some("export-complete"));
        let percents: Vec<f64> = events
            .iter()
            .filter_map(|e| ExportProgress::from_event(e).map(|p| p.percent))
            .collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_export_overlap_reports_error_only() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, transcoder) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        session
            .add_clip(track, "a.mp4", ClipOptions::default())
            .await
            .unwrap();
        session
            .add_clip(
                track,
                "b.mp4",
                ClipOptions {
                    timeline_start: Some(secs(5)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let rx = session.events().channel();
        let result = session
            .export(ExportSettings::new(dir.path().join("out.mp4")))
            .await;
        assert!(matches!(
            result,
            Err(SpliceError::ValidationFailed(ValidationError::Overlap { .. }))
        ));
        assert_eq!(names(&rx), vec!["export-error"]);
        assert!(transcoder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_preview_maps_timeline_to_source_time() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, transcoder) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Video, TrackOptions::default())
            .unwrap();
        session
            .add_clip(
                track,
                "a.mp4",
                ClipOptions {
                    source_start: Some(secs(2)),
                    timeline_start: Some(secs(10)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let rx = session.events().channel();
        let path = session.generate_preview(secs(13), None).await.unwrap();
        assert_eq!(path, dir.path().join("previews").join("preview-13000.jpg"));
        assert!(path.exists());
        match transcoder.calls().last() {
            Some(splice_media::testing::TranscodeCall::Snapshot { at, .. }) => {
                assert_eq!(*at, secs(5))
            }
            other => panic!("expected snapshot call, got {other:?}"),
        }
        assert_eq!(names(&rx), vec!["preview-start", "preview-complete"]);

        let miss = session.generate_preview(secs(1), None).await;
        assert!(matches!(miss, Err(SpliceError::Preview(_))));
        assert_eq!(names(&rx), vec!["preview-start", "preview-error"]);
    }

    #[tokio::test]
    async fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_in(dir.path());
        let track = session
            .add_track(TrackKind::Both, TrackOptions::default())
            .unwrap();
        session
            .add_clip(track, "c.mp4", ClipOptions::default())
            .await
            .unwrap();
        let path = dir.path().join("project.json");
        session.save(&path).unwrap();

        let (mut other, _) = session_in(dir.path());
        other.open(&path).unwrap();
        assert_eq!(other.get_timeline(), session.get_timeline());
        assert!(other.can_undo());
    }
}
