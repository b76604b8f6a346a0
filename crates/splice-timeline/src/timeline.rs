//! The timeline aggregate and the clip operations that mutate it.
//!
//! Every operation either succeeds completely or leaves the timeline exactly
//! as it was. Clip ordering inside a track is restored before returning.
//! Overlap between clips is not rejected here; it is reported by
//! [`crate::validate`] right before export.

use serde::{Deserialize, Serialize};
use splice_core::{
    FrameRate, RationalTime, Result, SpliceError, TimelineDefaults, TrackKind, ValidationError,
};
use std::collections::HashSet;
use uuid::Uuid;

use crate::clip::{Clip, ClipSource, Transition};
use crate::track::{Track, TrackOptions};

/// Output canvas of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSettings {
    pub frame_rate: FrameRate,
    pub width: u32,
    pub height: u32,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self::from(&TimelineDefaults::default())
    }
}

impl From<&TimelineDefaults> for TimelineSettings {
    fn from(defaults: &TimelineDefaults) -> Self {
        Self {
            frame_rate: defaults.frame_rate,
            width: defaults.width,
            height: defaults.height,
            audio_sample_rate: defaults.audio_sample_rate,
            audio_channels: defaults.audio_channels,
        }
    }
}

/// Optional parameters of [`Timeline::add_clip`]. Unset fields take the
/// defaults: whole source, appended after the track's last clip, no
/// transition, unit volume and speed.
#[derive(Debug, Clone, Default)]
pub struct ClipOptions {
    pub name: Option<String>,
    pub source_start: Option<RationalTime>,
    pub source_end: Option<RationalTime>,
    pub timeline_start: Option<RationalTime>,
    pub transition: Option<Transition>,
    pub volume: Option<f32>,
    pub speed: Option<f64>,
}

/// Parameters of [`Timeline::trim_clip`].
///
/// `duration` wins over `end` when both are given.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimOptions {
    pub start: Option<RationalTime>,
    pub end: Option<RationalTime>,
    pub duration: Option<RationalTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimOutcome {
    pub old_duration: RationalTime,
    pub new_duration: RationalTime,
}

/// Ids of the two clips that replaced a split clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    pub first: Uuid,
    pub second: Uuid,
}

/// The whole editable timeline: an ordered list of tracks plus the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    settings: TimelineSettings,
    tracks: Vec<Track>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(TimelineSettings::default())
    }
}

impl Timeline {
    pub fn new(settings: TimelineSettings) -> Self {
        Self {
            settings,
            tracks: Vec::new(),
        }
    }

    /// Build a timeline from a snapshot, re-checking every invariant.
    pub fn from_snapshot(snapshot: TimelineSnapshot) -> Result<Self> {
        let TimelineSnapshot { settings, mut tracks } = snapshot;
        let mut track_ids = HashSet::new();
        let mut clip_ids = HashSet::new();
        for track in &mut tracks {
            if !track_ids.insert(track.id()) {
                return Err(SpliceError::InvalidParameter(format!(
                    "duplicate track id {}",
                    track.id()
                )));
            }
            track.normalize()?;
            for clip in track.clips() {
                if !clip_ids.insert(clip.id) {
                    return Err(SpliceError::InvalidParameter(format!(
                        "duplicate clip id {}",
                        clip.id
                    )));
                }
            }
        }
        Ok(Self { settings, tracks })
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, track_id: Uuid) -> Result<&Track> {
        self.tracks
            .iter()
            .find(|t| t.id() == track_id)
            .ok_or(SpliceError::TrackNotFound { track_id })
    }

    /// Mutable access for non-structural track state (name, mute, volume,
    /// lock).
    pub fn track_mut(&mut self, track_id: Uuid) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.id() == track_id)
            .ok_or(SpliceError::TrackNotFound { track_id })
    }

    fn track_index(&self, track_id: Uuid) -> Result<usize> {
        self.tracks
            .iter()
            .position(|t| t.id() == track_id)
            .ok_or(SpliceError::TrackNotFound { track_id })
    }

    /// Unlocked track, ready for a structural edit.
    fn editable_track(&mut self, track_id: Uuid) -> Result<&mut Track> {
        let track = self.track_mut(track_id)?;
        track.ensure_unlocked()?;
        Ok(track)
    }

    // ── Tracks ──────────────────────────────────────────────────

    /// Append a new empty track and return its id.
    pub fn add_track(&mut self, kind: TrackKind, options: TrackOptions) -> Result<Uuid> {
        let track = Track::new(kind, options)?;
        let id = track.id();
        tracing::debug!(track_id = %id, %kind, "Track added");
        self.tracks.push(track);
        Ok(id)
    }

    pub fn remove_track(&mut self, track_id: Uuid) -> Result<Track> {
        let index = self.track_index(track_id)?;
        self.tracks[index].ensure_unlocked()?;
        let track = self.tracks.remove(index);
        tracing::debug!(track_id = %track_id, clips = track.clip_count(), "Track removed");
        Ok(track)
    }

    // ── Clips ───────────────────────────────────────────────────

    /// Place an excerpt of `source` on a track and return the new clip id.
    pub fn add_clip(
        &mut self,
        track_id: Uuid,
        source: ClipSource,
        options: ClipOptions,
    ) -> Result<Uuid> {
        let track = self.editable_track(track_id)?;
        let source_start = options.source_start.unwrap_or(RationalTime::ZERO);
        let source_end = options.source_end.unwrap_or(source.duration);
        let timeline_start = options.timeline_start.unwrap_or_else(|| track.end_time());

        let mut clip = Clip::new(
            source,
            track.kind(),
            source_start,
            source_end,
            timeline_start,
        )?;
        clip.name = options.name;
        if let Some(volume) = options.volume {
            clip.set_volume(volume)?;
        }
        if let Some(speed) = options.speed {
            clip.set_speed(speed)?;
        }
        if let Some(transition) = options.transition {
            clip.set_transition(transition)?;
        }

        let id = clip.id;
        tracing::debug!(
            track_id = %track_id,
            clip_id = %id,
            start = %clip.timeline_start(),
            end = %clip.timeline_end(),
            "Clip added"
        );
        track.insert(clip);
        Ok(id)
    }

    pub fn remove_clip(&mut self, track_id: Uuid, clip_id: Uuid) -> Result<Clip> {
        self.editable_track(track_id)?.remove(clip_id)
    }

    /// Narrow or widen a clip's source window. The timeline start never
    /// moves; the timeline end follows the new duration.
    pub fn trim_clip(
        &mut self,
        track_id: Uuid,
        clip_id: Uuid,
        options: TrimOptions,
    ) -> Result<TrimOutcome> {
        let clip = self.editable_track(track_id)?.clip_mut(clip_id)?;
        let old_duration = clip.duration();
        let start = options.start.unwrap_or(clip.source_start());
        let end = match (options.duration, options.end) {
            (Some(duration), _) => start + duration,
            (None, Some(end)) => end,
            (None, None) => clip.source_end(),
        };
        clip.set_source_window(start, end)?;
        Ok(TrimOutcome {
            old_duration,
            new_duration: clip.duration(),
        })
    }

    /// Replace a clip with two contiguous clips cut `offset` after its start.
    pub fn split_clip(
        &mut self,
        track_id: Uuid,
        clip_id: Uuid,
        offset: RationalTime,
    ) -> Result<SplitOutcome> {
        let track = self.editable_track(track_id)?;
        let index = track.position_of(clip_id)?;
        let (first, second) = track.clips()[index].split(offset)?;
        let outcome = SplitOutcome {
            first: first.id,
            second: second.id,
        };
        track.remove(clip_id)?;
        track.insert(first);
        track.insert(second);
        Ok(outcome)
    }

    /// Reposition a clip on its own track and return its previous start.
    pub fn move_clip(
        &mut self,
        track_id: Uuid,
        clip_id: Uuid,
        new_start: RationalTime,
    ) -> Result<RationalTime> {
        let track = self.editable_track(track_id)?;
        let clip = track.clip_mut(clip_id)?;
        let old_start = clip.timeline_start();
        clip.set_timeline_start(new_start)?;
        track.sort_clips();
        Ok(old_start)
    }

    /// Move a clip to another track, keeping its timeline position.
    pub fn move_clip_to_track(
        &mut self,
        from_track_id: Uuid,
        to_track_id: Uuid,
        clip_id: Uuid,
    ) -> Result<()> {
        let from = self.track_index(from_track_id)?;
        let to = self.track_index(to_track_id)?;
        self.tracks[from].ensure_unlocked()?;
        self.tracks[to].ensure_unlocked()?;

        let source_kind = self.tracks[from]
            .find_clip(clip_id)
            .map(|c| c.track_kind)
            .ok_or(SpliceError::ClipNotFound {
                track_id: from_track_id,
                clip_id,
            })?;
        let target_kind = self.tracks[to].kind();
        if !target_kind.accepts(source_kind) {
            return Err(SpliceError::IncompatibleTrackKind {
                clip_id,
                from: source_kind,
                to: target_kind,
            });
        }
        if from == to {
            return Ok(());
        }

        let mut clip = self.tracks[from].remove(clip_id)?;
        clip.track_kind = target_kind;
        self.tracks[to].insert(clip);
        Ok(())
    }

    /// Attach transition metadata. Allowed on locked tracks since it does not
    /// change placement.
    pub fn apply_transition(
        &mut self,
        track_id: Uuid,
        clip_id: Uuid,
        transition: Transition,
    ) -> Result<()> {
        self.track_mut(track_id)?
            .clip_mut(clip_id)?
            .set_transition(transition)
    }

    // ── Whole-timeline ──────────────────────────────────────────

    /// Latest clip end over all tracks.
    pub fn duration(&self) -> RationalTime {
        self.tracks
            .iter()
            .map(Track::end_time)
            .max()
            .unwrap_or(RationalTime::ZERO)
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(Track::clip_count).sum()
    }

    /// Find a clip anywhere on the timeline.
    pub fn find_clip(&self, clip_id: Uuid) -> Option<(&Track, &Clip)> {
        self.tracks
            .iter()
            .find_map(|t| t.find_clip(clip_id).map(|c| (t, c)))
    }

    /// Drop every track. Settings are kept.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot::from(self)
    }

    /// Replace the whole state. On error the timeline is unchanged.
    pub fn load(&mut self, snapshot: TimelineSnapshot) -> Result<()> {
        *self = Self::from_snapshot(snapshot)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        crate::validate::validate(&self.tracks)
    }
}

/// Value copy of a timeline. This is the only interchange form: it is what
/// gets persisted, what history stores, and what export consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    settings: TimelineSettings,
    tracks: Vec<Track>,
}

impl From<&Timeline> for TimelineSnapshot {
    fn from(timeline: &Timeline) -> Self {
        Self {
            settings: timeline.settings.clone(),
            tracks: timeline.tracks.clone(),
        }
    }
}

impl TimelineSnapshot {
    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, track_id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == track_id)
    }

    pub fn duration(&self) -> RationalTime {
        self.tracks
            .iter()
            .map(Track::end_time)
            .max()
            .unwrap_or(RationalTime::ZERO)
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(Track::clip_count).sum()
    }

    /// Every clip with its owning track: tracks in order, clips by start.
    pub fn export_order(&self) -> impl Iterator<Item = (&Track, &Clip)> + '_ {
        self.tracks
            .iter()
            .flat_map(|t| t.clips().iter().map(move |c| (t, c)))
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        crate::validate::validate(&self.tracks)
    }
}
