//! Track types for the timeline.

use serde::{Deserialize, Serialize};
use splice_core::{RationalTime, Result, SpliceError, TrackKind};
use uuid::Uuid;

use crate::clip::{check_unit_volume, Clip};

/// Options accepted when creating a track.
#[derive(Debug, Clone)]
pub struct TrackOptions {
    pub name: Option<String>,
    pub muted: bool,
    pub volume: f32,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            name: None,
            muted: false,
            volume: 1.0,
        }
    }
}

/// An ordered lane of clips.
///
/// `clips` is always sorted ascending by `timeline_start`; every mutation in
/// this module re-establishes that order before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    id: Uuid,
    kind: TrackKind,
    /// Track name
    pub name: String,
    clips: Vec<Clip>,
    /// Is track muted
    pub muted: bool,
    volume: f32,
    /// Is track locked (prevent structural edits)
    pub locked: bool,
}

impl Track {
    /// Create a new empty track.
    pub fn new(kind: TrackKind, options: TrackOptions) -> Result<Self> {
        check_unit_volume(options.volume)?;
        let id = Uuid::new_v4();
        Ok(Self {
            id,
            kind,
            name: options.name.unwrap_or_else(|| format!("{kind} track")),
            clips: Vec::new(),
            muted: options.muted,
            volume: options.volume,
            locked: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        check_unit_volume(volume)?;
        self.volume = volume;
        Ok(())
    }

    /// Clips in timeline order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Number of clips in this track.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Latest `timeline_end` on the track, zero when empty.
    pub fn end_time(&self) -> RationalTime {
        self.clips
            .iter()
            .map(Clip::timeline_end)
            .max()
            .unwrap_or(RationalTime::ZERO)
    }

    /// Find a clip by UUID.
    pub fn find_clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub(crate) fn position_of(&self, id: Uuid) -> Result<usize> {
        self.clips
            .iter()
            .position(|c| c.id == id)
            .ok_or(SpliceError::ClipNotFound {
                track_id: self.id,
                clip_id: id,
            })
    }

    pub(crate) fn clip_mut(&mut self, id: Uuid) -> Result<&mut Clip> {
        let index = self.position_of(id)?;
        Ok(&mut self.clips[index])
    }

    /// The clip whose timeline window contains `time`.
    pub fn clip_at(&self, time: RationalTime) -> Option<&Clip> {
        self.clips
            .iter()
            .find(|c| c.timeline_range().contains(time))
    }

    /// Insert keeping timeline order. A clip starting at the same time as an
    /// existing one goes after it.
    pub(crate) fn insert(&mut self, clip: Clip) {
        let start = clip.timeline_start();
        let index = self
            .clips
            .partition_point(|c| c.timeline_start() <= start);
        self.clips.insert(index, clip);
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Result<Clip> {
        let index = self.position_of(id)?;
        Ok(self.clips.remove(index))
    }

    /// Stable re-sort after a clip moved.
    pub(crate) fn sort_clips(&mut self) {
        self.clips.sort_by_key(Clip::timeline_start);
    }

    /// Fail with `TrackLocked` if structural edits are blocked.
    pub fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(SpliceError::TrackLocked { track_id: self.id });
        }
        Ok(())
    }

    /// Linear gain for `clip` once track mute and volume apply.
    pub fn effective_gain(&self, clip: &Clip) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume * clip.volume()
        }
    }

    /// First adjacent pair (in timeline order) whose windows overlap.
    pub fn first_overlap(&self) -> Option<(&Clip, &Clip)> {
        self.clips
            .windows(2)
            .find(|pair| pair[0].timeline_end() > pair[1].timeline_start())
            .map(|pair| (&pair[0], &pair[1]))
    }

    /// Re-check invariants of externally supplied data and restore ordering.
    pub(crate) fn normalize(&mut self) -> Result<()> {
        check_unit_volume(self.volume)?;
        for clip in &self.clips {
            clip.check_invariants()?;
            if !self.kind.accepts(clip.track_kind) {
                return Err(SpliceError::IncompatibleTrackKind {
                    clip_id: clip.id,
                    from: clip.track_kind,
                    to: self.kind,
                });
            }
        }
        self.sort_clips();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipSource;

    fn secs(s: i64) -> RationalTime {
        RationalTime::from_seconds(s)
    }

    fn clip_at(start: i64, len: i64) -> Clip {
        Clip::new(
            ClipSource::new("a.mp4", secs(60)),
            TrackKind::Video,
            secs(0),
            secs(len),
            secs(start),
        )
        .unwrap()
    }

    fn video_track() -> Track {
        Track::new(TrackKind::Video, TrackOptions::default()).unwrap()
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut track = video_track();
        track.insert(clip_at(20, 5));
        track.insert(clip_at(0, 5));
        track.insert(clip_at(10, 5));
        let starts: Vec<_> = track.clips().iter().map(Clip::timeline_start).collect();
        assert_eq!(starts, vec![secs(0), secs(10), secs(20)]);
        assert_eq!(track.end_time(), secs(25));
    }

    #[test]
    fn test_equal_starts_insert_after_existing() {
        let mut track = video_track();
        let first = clip_at(5, 1);
        let first_id = first.id;
        track.insert(first);
        track.insert(clip_at(5, 2));
        assert_eq!(track.clips()[0].id, first_id);
    }

    #[test]
    fn test_clip_at_and_overlap() {
        let mut track = video_track();
        track.insert(clip_at(0, 10));
        track.insert(clip_at(8, 4));
        assert_eq!(track.clip_at(secs(9)).unwrap().timeline_start(), secs(0));
        assert_eq!(track.clip_at(secs(11)).unwrap().timeline_start(), secs(8));
        assert!(track.clip_at(secs(12)).is_none());

        let (a, b) = track.first_overlap().unwrap();
        assert_eq!(a.timeline_start(), secs(0));
        assert_eq!(b.timeline_start(), secs(8));
    }

    #[test]
    fn test_touching_clips_do_not_overlap() {
        let mut track = video_track();
        track.insert(clip_at(0, 10));
        track.insert(clip_at(10, 4));
        assert!(track.first_overlap().is_none());
    }

    #[test]
    fn test_effective_gain() {
        let mut track = Track::new(
            TrackKind::Audio,
            TrackOptions {
                volume: 0.5,
                ..Default::default()
            },
        )
        .unwrap();
        let mut clip = clip_at(0, 1);
        clip.set_volume(0.5).unwrap();
        assert!((track.effective_gain(&clip) - 0.25).abs() < f32::EPSILON);
        track.muted = true;
        assert_eq!(track.effective_gain(&clip), 0.0);
    }

    #[test]
    fn test_locked_track_reports_id() {
        let mut track = video_track();
        track.locked = true;
        match track.ensure_unlocked() {
            Err(SpliceError::TrackLocked { track_id }) => assert_eq!(track_id, track.id()),
            other => panic!("expected TrackLocked, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_track_volume() {
        let result = Track::new(
            TrackKind::Audio,
            TrackOptions {
                volume: 2.0,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(SpliceError::InvalidParameter(_))));
    }
}
