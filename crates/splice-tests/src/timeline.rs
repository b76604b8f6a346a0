//! Integration tests for the timeline subsystem.
//!
//! Exercises splice-core time arithmetic through splice-timeline edits,
//! history and the on-disk format.

use proptest::prelude::*;
use splice_core::{RationalTime, SpliceError, TrackKind, ValidationError};
use splice_timeline::{
    ClipOptions, ClipSource, History, Timeline, TimelineFile, TimelineSettings, TrackOptions,
    TrimOptions,
};
use uuid::Uuid;

// ── Helpers ────────────────────────────────────────────────────

fn ms(value: i64) -> RationalTime {
    RationalTime::new(value, 1000)
}

fn source(name: &str, millis: i64) -> ClipSource {
    ClipSource::new(format!("media/{name}.mp4"), ms(millis))
}

fn one_track(kind: TrackKind) -> (Timeline, Uuid) {
    let mut timeline = Timeline::new(TimelineSettings::default());
    let track = timeline.add_track(kind, TrackOptions::default()).unwrap();
    (timeline, track)
}

/// Brute-force overlap check across every pair on a track.
fn has_overlap(timeline: &Timeline) -> bool {
    timeline.tracks().iter().any(|track| {
        let clips = track.clips();
        clips.iter().enumerate().any(|(i, a)| {
            clips[i + 1..].iter().any(|b| {
                a.timeline_start() < b.timeline_end() && b.timeline_start() < a.timeline_end()
            })
        })
    })
}

fn is_sorted(timeline: &Timeline) -> bool {
    timeline.tracks().iter().all(|t| {
        t.clips()
            .windows(2)
            .all(|w| w[0].timeline_start() <= w[1].timeline_start())
    })
}

// ── Laws ───────────────────────────────────────────────────────

proptest! {
    /// Splitting preserves total duration and leaves the halves touching
    /// in both timeline and source time.
    #[test]
    fn split_is_contiguous(
        length in 2i64..120_000,
        start in 0i64..60_000,
        cut in 1i64..120_000,
    ) {
        prop_assume!(cut < length);
        let (mut timeline, track) = one_track(TrackKind::Video);
        let clip = timeline
            .add_clip(
                track,
                source("a", length),
                ClipOptions { timeline_start: Some(ms(start)), ..Default::default() },
            )
            .unwrap();

        let outcome = timeline.split_clip(track, clip, ms(cut)).unwrap();
        let t = timeline.track(track).unwrap();
        prop_assert!(t.find_clip(clip).is_none());
        let first = t.find_clip(outcome.first).unwrap();
        let second = t.find_clip(outcome.second).unwrap();

        prop_assert_eq!(first.duration() + second.duration(), ms(length));
        prop_assert_eq!(first.timeline_end(), second.timeline_start());
        prop_assert_eq!(first.source_end(), second.source_start());
        prop_assert_eq!(first.timeline_start(), ms(start));
        prop_assert_eq!(second.timeline_end(), ms(start + length));
    }

    /// Trimming never moves the clip start and always yields end - start.
    #[test]
    fn trim_keeps_start(
        length in 2i64..120_000,
        a in 0i64..120_000,
        b in 0i64..120_000,
        placed_at in 0i64..60_000,
    ) {
        let (mut timeline, track) = one_track(TrackKind::Audio);
        let clip = timeline
            .add_clip(
                track,
                source("a", length),
                ClipOptions { timeline_start: Some(ms(placed_at)), ..Default::default() },
            )
            .unwrap();
        let before = timeline.snapshot();

        let options = TrimOptions { start: Some(ms(a)), end: Some(ms(b)), duration: None };
        match timeline.trim_clip(track, clip, options) {
            Ok(outcome) => {
                prop_assert!(a < b && b <= length);
                let c = timeline.track(track).unwrap().find_clip(clip).unwrap();
                prop_assert_eq!(outcome.new_duration, ms(b - a));
                prop_assert_eq!(c.timeline_start(), ms(placed_at));
                prop_assert_eq!(c.timeline_end(), ms(placed_at + b - a));
            }
            Err(e) => {
                let is_range_error = matches!(e, SpliceError::InvalidTimeRange { .. });
                prop_assert!(is_range_error);
                prop_assert!(a >= b || b > length);
                prop_assert_eq!(timeline.snapshot(), before);
            }
        }
    }

    /// Whatever the sequence of placements, clips stay ordered by start and
    /// validation agrees with a brute-force overlap check.
    #[test]
    fn ordering_and_overlap_detection(
        placements in prop::collection::vec((0i64..30_000, 1i64..10_000), 1..12),
        moves in prop::collection::vec((0usize..12, 0i64..30_000), 0..8),
    ) {
        let (mut timeline, track) = one_track(TrackKind::Both);
        let mut ids = Vec::new();
        for (i, (start, length)) in placements.iter().enumerate() {
            let id = timeline
                .add_clip(
                    track,
                    source(&format!("clip{i}"), *length),
                    ClipOptions { timeline_start: Some(ms(*start)), ..Default::default() },
                )
                .unwrap();
            ids.push(id);
        }
        for (index, start) in moves {
            let id = ids[index % ids.len()];
            timeline.move_clip(track, id, ms(start)).unwrap();
        }

        prop_assert!(is_sorted(&timeline));
        let overlap = matches!(timeline.validate(), Err(ValidationError::Overlap { .. }));
        prop_assert_eq!(overlap, has_overlap(&timeline));
    }
}

// ── Assembly & timing ──────────────────────────────────────────

#[test]
fn appended_clips_butt_against_each_other() {
    let (mut timeline, track) = one_track(TrackKind::Video);
    for (name, length) in [("intro", 5_000), ("body", 30_000), ("outro", 10_000)] {
        timeline
            .add_clip(track, source(name, length), ClipOptions::default())
            .unwrap();
    }
    let clips = timeline.track(track).unwrap().clips();
    assert_eq!(clips[1].timeline_start(), ms(5_000));
    assert_eq!(clips[2].timeline_start(), ms(35_000));
    assert_eq!(timeline.duration(), ms(45_000));
    assert!(timeline.validate().is_ok());
}

#[test]
fn duration_is_max_over_tracks() {
    let mut timeline = Timeline::new(TimelineSettings::default());
    let video = timeline
        .add_track(TrackKind::Video, TrackOptions::default())
        .unwrap();
    let audio = timeline
        .add_track(TrackKind::Audio, TrackOptions::default())
        .unwrap();
    timeline
        .add_clip(video, source("v", 12_000), ClipOptions::default())
        .unwrap();
    timeline
        .add_clip(
            audio,
            source("music", 20_000),
            ClipOptions {
                timeline_start: Some(ms(4_000)),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(timeline.duration(), ms(24_000));
    assert_eq!(timeline.clip_count(), 2);
}

#[test]
fn empty_timeline_is_not_exportable() {
    let timeline = Timeline::new(TimelineSettings::default());
    assert_eq!(timeline.validate(), Err(ValidationError::NoTracks));

    let (timeline, _) = one_track(TrackKind::Video);
    assert_eq!(timeline.validate(), Err(ValidationError::NoClips));
}

#[test]
fn cross_track_move_respects_kinds() {
    let mut timeline = Timeline::new(TimelineSettings::default());
    let video = timeline
        .add_track(TrackKind::Video, TrackOptions::default())
        .unwrap();
    let audio = timeline
        .add_track(TrackKind::Audio, TrackOptions::default())
        .unwrap();
    let both = timeline
        .add_track(TrackKind::Both, TrackOptions::default())
        .unwrap();
    let clip = timeline
        .add_clip(video, source("v", 3_000), ClipOptions::default())
        .unwrap();

    let err = timeline.move_clip_to_track(video, audio, clip).unwrap_err();
    assert!(matches!(err, SpliceError::IncompatibleTrackKind { .. }));
    assert_eq!(timeline.track(video).unwrap().clip_count(), 1);

    timeline.move_clip_to_track(video, both, clip).unwrap();
    let (track, moved) = timeline.find_clip(clip).unwrap();
    assert_eq!(track.id(), both);
    assert_eq!(moved.timeline_start(), RationalTime::ZERO);
}

// ── History & persistence ──────────────────────────────────────

#[test]
fn history_walks_back_through_edits() {
    let (mut timeline, track) = one_track(TrackKind::Video);
    let mut history = History::new(10);
    let mut states = vec![timeline.snapshot()];

    for length in [1_000, 2_000, 3_000] {
        history.record(timeline.snapshot());
        timeline
            .add_clip(track, source("x", length), ClipOptions::default())
            .unwrap();
        states.push(timeline.snapshot());
    }

    for expected in states.iter().rev().skip(1) {
        let previous = history.undo(timeline.snapshot()).unwrap();
        timeline.load(previous).unwrap();
        assert_eq!(&timeline.snapshot(), expected);
    }
    assert!(!history.can_undo());
    assert_eq!(history.redo_count(), 3);
}

#[test]
fn file_round_trip_preserves_timeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");

    let (mut timeline, track) = one_track(TrackKind::Both);
    let clip = timeline
        .add_clip(
            track,
            source("a", 9_000),
            ClipOptions {
                source_start: Some(ms(1_500)),
                volume: Some(0.5),
                ..Default::default()
            },
        )
        .unwrap();
    timeline.split_clip(track, clip, ms(2_000)).unwrap();

    TimelineFile::new(timeline.snapshot())
        .save_to_file(&path)
        .unwrap();
    let restored = TimelineFile::load_from_file(&path)
        .unwrap()
        .into_timeline()
        .unwrap();
    assert_eq!(restored.snapshot(), timeline.snapshot());
}

#[test]
fn newer_file_versions_are_rejected() {
    let (mut timeline, track) = one_track(TrackKind::Video);
    timeline
        .add_clip(track, source("a", 4_000), ClipOptions::default())
        .unwrap();
    let json = String::from_utf8(TimelineFile::new(timeline.snapshot()).to_json().unwrap()).unwrap();
    assert!(TimelineFile::from_json(json.as_bytes()).is_ok());

    let future = json.replacen("\"version\": 1", "\"version\": 7", 1);
    let err = TimelineFile::from_json(future.as_bytes()).unwrap_err();
    assert!(matches!(err, SpliceError::Serialization(_)));
}
