//! Clip types for the timeline.

use serde::{Deserialize, Serialize};
use splice_core::{RationalTime, Result, SpliceError, TimeRange, TrackKind};
use std::path::PathBuf;
use uuid::Uuid;

/// Reference to an external media file plus the probed facts the timeline
/// needs. The editor never owns the file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSource {
    /// Path to the media file
    pub path: PathBuf,
    /// Probed source duration
    pub duration: RationalTime,
    #[serde(default = "default_true")]
    pub has_video: bool,
    #[serde(default = "default_true")]
    pub has_audio: bool,
}

fn default_true() -> bool {
    true
}

impl ClipSource {
    /// Create a source reference with both audio and video streams.
    pub fn new(path: impl Into<PathBuf>, duration: RationalTime) -> Self {
        Self {
            path: path.into(),
            duration,
            has_video: true,
            has_audio: true,
        }
    }

    /// Record which streams the source actually carries.
    pub fn with_streams(mut self, has_video: bool, has_audio: bool) -> Self {
        self.has_video = has_video;
        self.has_audio = has_audio;
        self
    }
}

/// Transition styles resolved at export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    None,
    Fade,
    Dissolve,
    Wipe,
    Slide,
    Zoom,
}

/// Transition applied at a clip's leading edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration: RationalTime,
}

impl Transition {
    pub fn new(kind: TransitionKind, duration: RationalTime) -> Self {
        Self { kind, duration }
    }

    /// Whether rendering this transition changes any output frame.
    pub fn is_visible(&self) -> bool {
        self.kind != TransitionKind::None && self.duration.is_positive()
    }
}

/// A bounded excerpt of a source file placed on the timeline.
///
/// `duration` and `timeline_end` are derived from the stored window, so a
/// clip can never disagree with itself about where it ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: Uuid,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Reference to source media
    pub source: ClipSource,
    /// Kind of the owning track when the clip was assigned to it
    pub track_kind: TrackKind,
    source_start: RationalTime,
    source_end: RationalTime,
    timeline_start: RationalTime,
    /// Leading-edge transition
    #[serde(default)]
    pub transition: Option<Transition>,
    volume: f32,
    speed: f64,
}

impl Clip {
    /// Create a clip taking `[source_start, source_end)` from `source`,
    /// placed at `timeline_start`.
    pub fn new(
        source: ClipSource,
        track_kind: TrackKind,
        source_start: RationalTime,
        source_end: RationalTime,
        timeline_start: RationalTime,
    ) -> Result<Self> {
        check_source_window(source_start, source_end, source.duration)?;
        check_position(timeline_start)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: None,
            source,
            track_kind,
            source_start,
            source_end,
            timeline_start,
            transition: None,
            volume: 1.0,
            speed: 1.0,
        })
    }

    pub fn source_start(&self) -> RationalTime {
        self.source_start
    }

    pub fn source_end(&self) -> RationalTime {
        self.source_end
    }

    /// `source_end - source_start`.
    pub fn duration(&self) -> RationalTime {
        self.source_end - self.source_start
    }

    pub fn timeline_start(&self) -> RationalTime {
        self.timeline_start
    }

    /// `timeline_start + duration`.
    pub fn timeline_end(&self) -> RationalTime {
        self.timeline_start + self.duration()
    }

    pub fn source_range(&self) -> TimeRange {
        TimeRange::from_start_end(self.source_start, self.source_end)
    }

    pub fn timeline_range(&self) -> TimeRange {
        TimeRange::new(self.timeline_start, self.duration())
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        check_unit_volume(volume)?;
        self.volume = volume;
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(SpliceError::InvalidParameter(format!(
                "speed must be a positive number, got {speed}"
            )));
        }
        self.speed = speed;
        Ok(())
    }

    /// Attach a transition. Its duration must fit inside the clip.
    pub fn set_transition(&mut self, transition: Transition) -> Result<()> {
        check_transition_fits(self.id, &transition, self.duration())?;
        self.transition = Some(transition);
        Ok(())
    }

    /// Replace the source window. The timeline start never moves.
    ///
    /// A window shorter than the attached transition is rejected.
    pub fn set_source_window(&mut self, start: RationalTime, end: RationalTime) -> Result<()> {
        check_source_window(start, end, self.source.duration)?;
        if let Some(transition) = &self.transition {
            check_transition_fits(self.id, transition, end - start)?;
        }
        self.source_start = start;
        self.source_end = end;
        Ok(())
    }

    /// Reposition the clip without touching its duration.
    pub fn set_timeline_start(&mut self, position: RationalTime) -> Result<()> {
        check_position(position)?;
        self.timeline_start = position;
        Ok(())
    }

    /// Split into two contiguous clips at `offset` from the clip start.
    ///
    /// Both halves get fresh ids and inherit everything else. Only the first
    /// half keeps the leading transition, shortened to `offset` if longer.
    pub fn split(&self, offset: RationalTime) -> Result<(Clip, Clip)> {
        let duration = self.duration();
        if !offset.is_positive() || offset >= duration {
            return Err(SpliceError::InvalidSplitPoint {
                clip_id: self.id,
                offset,
                duration,
            });
        }
        let cut = self.source_start + offset;

        let mut first = self.clone();
        first.id = Uuid::new_v4();
        first.source_end = cut;
        if let Some(transition) = first.transition.as_mut() {
            transition.duration = transition.duration.min(offset);
        }

        let mut second = self.clone();
        second.id = Uuid::new_v4();
        second.source_start = cut;
        second.timeline_start = first.timeline_end();
        second.transition = None;

        Ok((first, second))
    }

    /// Map a timeline time inside this clip to the source time shown there.
    pub fn source_time_at(&self, timeline_time: RationalTime) -> Option<RationalTime> {
        if !self.timeline_range().contains(timeline_time) {
            return None;
        }
        let into_clip = (timeline_time - self.timeline_start).to_seconds_f64() * self.speed;
        let at = self.source_start + RationalTime::from_seconds_f64(into_clip);
        // Sped-up clips run out of source before their timeline window ends;
        // hold the last microsecond of the window.
        let last = (self.source_end - RationalTime::new(1, 1_000_000)).max(self.source_start);
        Some(at.min(last))
    }

    /// Re-check every per-clip invariant (used when loading external data).
    pub(crate) fn check_invariants(&self) -> Result<()> {
        check_source_window(self.source_start, self.source_end, self.source.duration)?;
        check_position(self.timeline_start)?;
        check_unit_volume(self.volume)?;
        if let Some(transition) = &self.transition {
            check_transition_fits(self.id, transition, self.duration())?;
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(SpliceError::InvalidParameter(format!(
                "clip {} has invalid speed {}",
                self.id, self.speed
            )));
        }
        Ok(())
    }
}

/// `0 <= start < end <= source_duration`.
pub fn check_source_window(
    start: RationalTime,
    end: RationalTime,
    source_duration: RationalTime,
) -> Result<()> {
    if start.is_negative() || start >= end || end > source_duration {
        return Err(SpliceError::InvalidTimeRange {
            start,
            end,
            source_duration,
        });
    }
    Ok(())
}

fn check_transition_fits(
    clip_id: Uuid,
    transition: &Transition,
    clip_duration: RationalTime,
) -> Result<()> {
    if transition.duration.is_negative() || transition.duration > clip_duration {
        return Err(SpliceError::InvalidParameter(format!(
            "transition of {} does not fit clip {clip_id} of {clip_duration}",
            transition.duration
        )));
    }
    Ok(())
}

fn check_position(position: RationalTime) -> Result<()> {
    if position.is_negative() {
        return Err(SpliceError::InvalidPosition { position });
    }
    Ok(())
}

/// Gains are linear multipliers in `[0, 1]`.
pub(crate) fn check_unit_volume(volume: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&volume) {
        return Err(SpliceError::InvalidParameter(format!(
            "volume must be within 0..=1, got {volume}"
        )));
    }
    Ok(())
}
