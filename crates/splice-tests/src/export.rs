//! Editing and export scenarios across splice-editor and splice-media,
//! run against the in-process fake prober and transcoder.

use parking_lot::Mutex;
use splice_core::{EditorConfig, RationalTime, SpliceError, TrackKind};
use splice_editor::events::{ExportFailed, ExportProgress};
use splice_editor::{EditorEvent, EditorPreset, EditorSession};
use splice_media::testing::{FakeProber, FakeTranscoder};
use splice_media::{ExportJob, ExportSettings, ExportState};
use splice_timeline::{ClipOptions, TrackOptions, Transition, TransitionKind, TrimOptions};
use std::path::Path;
use std::sync::Arc;

// ── Helpers ────────────────────────────────────────────────────

fn secs(value: i64) -> RationalTime {
    RationalTime::from_seconds(value)
}

fn prober() -> Arc<FakeProber> {
    Arc::new(
        FakeProber::new()
            .with_media("intro.mp4", 5)
            .with_media("talk.mp4", 60)
            .with_media("outro.mp4", 8)
            .with_media("music.mp3", 90),
    )
}

fn session(dir: &Path, transcoder: Arc<FakeTranscoder>) -> EditorSession {
    let config = EditorConfig {
        temp_dir: dir.join("work"),
        ..EditorConfig::default()
    };
    EditorSession::from_preset(EditorPreset::Course, config, prober(), transcoder)
}

/// Video track with intro, a trimmed talk and outro; music on an audio track.
async fn course_edit(session: &mut EditorSession) -> (uuid::Uuid, uuid::Uuid) {
    let video = session
        .add_track(TrackKind::Video, TrackOptions::default())
        .unwrap();
    let music = session
        .add_track(TrackKind::Audio, TrackOptions::default())
        .unwrap();

    session
        .add_clip(video, "intro.mp4", ClipOptions::default())
        .await
        .unwrap();
    let talk = session
        .add_clip(video, "talk.mp4", ClipOptions::default())
        .await
        .unwrap();
    session
        .trim_clip(
            video,
            talk,
            TrimOptions {
                start: Some(secs(10)),
                duration: Some(secs(20)),
                ..Default::default()
            },
        )
        .unwrap();
    let outro = session
        .add_clip(
            video,
            "outro.mp4",
            ClipOptions {
                timeline_start: Some(secs(25)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    session
        .apply_transition(video, outro, Transition::new(TransitionKind::Fade, secs(1)))
        .unwrap();
    session
        .add_clip(
            music,
            "music.mp3",
            ClipOptions {
                source_end: Some(secs(33)),
                volume: Some(0.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    (video, music)
}

// ── Scenarios ──────────────────────────────────────────────────

#[tokio::test]
async fn course_export_renders_every_clip_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(FakeTranscoder::new());
    let mut session = session(dir.path(), transcoder.clone());
    let (_, music) = course_edit(&mut session).await;
    session.set_track_volume(music, 0.8).unwrap();

    let output = dir.path().join("course.mp4");
    let summary = session
        .export(session.default_export_settings(output.clone()))
        .await
        .unwrap();

    assert_eq!(summary.output_path, output);
    assert!(output.exists());
    assert_eq!((summary.track_count, summary.clip_count), (2, 4));
    assert_eq!(summary.duration, secs(33));

    let extracts = transcoder.extract_calls();
    let sources: Vec<_> = extracts
        .iter()
        .map(|r| r.source.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(sources, ["intro.mp4", "talk.mp4", "outro.mp4", "music.mp3"]);

    // Trimmed window reaches the transcoder.
    assert_eq!((extracts[1].source_start, extracts[1].source_end), (secs(10), secs(30)));
    // Only the outro fades in.
    assert_eq!(extracts[2].fade_in, Some(secs(1)));
    assert!(extracts.iter().take(2).all(|r| r.fade_in.is_none()));
    // Audio-track clips render over black.
    assert!(!extracts[3].use_source_video);
    assert!((extracts[3].gain - 0.4).abs() < 1e-6);
    // Every fragment matches the course canvas.
    assert!(extracts
        .iter()
        .all(|r| (r.canvas.width, r.canvas.height) == (1920, 1080)));

    let combine = transcoder.combine_calls();
    assert_eq!(combine.len(), 1);
    assert_eq!(combine[0].fragments.len(), 4);
    assert_eq!(combine[0].settings.crf, 20);

    // Job directory is gone after success.
    let leftovers = std::fs::read_dir(dir.path().join("work")).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn progress_is_monotonic_and_bracketed() {
    let dir = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(
        FakeTranscoder::new().with_combine_progress(vec![0.1, 0.1, 0.6, 0.3, 1.0]),
    );
    let mut session = session(dir.path(), transcoder);
    course_edit(&mut session).await;

    let rx = session.events().channel();
    session
        .export(ExportSettings::new(dir.path().join("out.mp4")))
        .await
        .unwrap();

    let events: Vec<EditorEvent> = rx.try_iter().collect();
    let names: Vec<_> = events.iter().map(EditorEvent::name).collect();
    assert_eq!(names.first(), Some(&"export-start"));
    assert_eq!(names.last(), Some(&"export-complete"));
    assert!(!names.contains(&"export-error"));

    let percents: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            EditorEvent::ExportProgress(p) => Some(p.percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents.first(), Some(&0.0));
    assert_eq!(percents.last(), Some(&100.0));
    assert!(percents.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn combine_failure_fails_job_and_keeps_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(FakeTranscoder::new().failing_combine());
    let mut session = session(dir.path(), transcoder);
    course_edit(&mut session).await;

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    session
        .events()
        .subscribe::<ExportFailed, _>(move |e| sink.lock().push(e.message.clone()));

    let mut job = ExportJob::new(ExportSettings::new(dir.path().join("out.mp4")));
    let err = session.export_job(&mut job).await.unwrap_err();
    assert!(matches!(err, SpliceError::CombineFailed { .. }));
    assert_eq!(job.state(), ExportState::Failed);
    assert!(job.failure().is_some());
    assert_eq!(errors.lock().len(), 1);

    let job_dir = dir.path().join("work").join(format!("export-{}", job.id()));
    assert!(job_dir.is_dir());
    assert_eq!(std::fs::read_dir(&job_dir).unwrap().count(), 4);
}

#[tokio::test]
async fn cancelling_from_a_listener_stops_the_job() {
    let dir = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(FakeTranscoder::new());
    let mut session = session(dir.path(), transcoder.clone());
    course_edit(&mut session).await;

    let mut job = ExportJob::new(ExportSettings::new(dir.path().join("out.mp4")));
    let cancel = job.cancel_handle();
    session.events().subscribe::<ExportProgress, _>(move |p| {
        if p.percent > 0.0 {
            cancel.cancel();
        }
    });

    let err = session.export_job(&mut job).await.unwrap_err();
    assert!(matches!(err, SpliceError::Cancelled));
    assert_eq!(job.state(), ExportState::Failed);
    assert_eq!(transcoder.extract_calls().len(), 1);
    assert!(transcoder.combine_calls().is_empty());
}

#[tokio::test]
async fn undo_back_to_empty_blocks_export() {
    let dir = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(FakeTranscoder::new());
    let mut session = session(dir.path(), transcoder.clone());
    course_edit(&mut session).await;

    while session.undo().unwrap() {}
    assert!(session.timeline().tracks().is_empty());
    assert!(!session.can_undo());

    let err = session
        .export(ExportSettings::new(dir.path().join("out.mp4")))
        .await
        .unwrap_err();
    assert!(matches!(err, SpliceError::ValidationFailed(_)));
    assert!(transcoder.calls().is_empty());

    // Everything comes back on redo.
    while session.redo().unwrap() {}
    assert_eq!(session.timeline().clip_count(), 4);
}

#[tokio::test]
async fn preview_prefers_first_track_with_video() {
    let dir = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(FakeTranscoder::new());
    let mut session = session(dir.path(), transcoder.clone());
    course_edit(&mut session).await;

    // 12s on the timeline is 7s into the talk, whose window starts at 10s.
    let image = dir.path().join("frame.jpg");
    let path = session
        .generate_preview(secs(12), Some(image.clone()))
        .await
        .unwrap();
    assert_eq!(path, image);

    let snapshot = transcoder.calls().pop().unwrap();
    match snapshot {
        splice_media::testing::TranscodeCall::Snapshot { source, at, .. } => {
            assert_eq!(source, Path::new("talk.mp4"));
            assert_eq!(at, secs(17));
        }
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_preview_reports_error_event() {
    let dir = tempfile::tempdir().unwrap();
    let transcoder = Arc::new(FakeTranscoder::new().failing_snapshot());
    let mut session = session(dir.path(), transcoder);
    course_edit(&mut session).await;

    let rx = session.events().channel();
    let err = session.generate_preview(secs(2), None).await.unwrap_err();
    assert!(matches!(err, SpliceError::Preview(_)));
    let names: Vec<_> = rx.try_iter().map(|e| e.name()).collect();
    assert_eq!(names, ["preview-start", "preview-error"]);
}
