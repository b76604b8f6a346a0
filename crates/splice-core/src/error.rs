//! Error types for Splice.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::kind::TrackKind;
use crate::time::RationalTime;

/// Main error type for Splice operations.
#[derive(Error, Debug)]
pub enum SpliceError {
    #[error("Track not found: {track_id}")]
    TrackNotFound { track_id: Uuid },

    #[error("Track is locked: {track_id}")]
    TrackLocked { track_id: Uuid },

    #[error("Clip {clip_id} not found on track {track_id}")]
    ClipNotFound { track_id: Uuid, clip_id: Uuid },

    #[error("Invalid time range [{start}, {end}) for a source of {source_duration}")]
    InvalidTimeRange {
        start: RationalTime,
        end: RationalTime,
        source_duration: RationalTime,
    },

    #[error("Invalid split point {offset} for clip {clip_id} of duration {duration}")]
    InvalidSplitPoint {
        clip_id: Uuid,
        offset: RationalTime,
        duration: RationalTime,
    },

    #[error("Invalid timeline position: {position}")]
    InvalidPosition { position: RationalTime },

    #[error("Cannot move clip {clip_id}: {from} track is incompatible with {to} track")]
    IncompatibleTrackKind {
        clip_id: Uuid,
        from: TrackKind,
        to: TrackKind,
    },

    #[error("Probe failed for {}: {reason}", path.display())]
    ProbeFailed { path: PathBuf, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Transcode failed for clip {clip_id}: {reason}")]
    TranscodeFailed { clip_id: Uuid, reason: String },

    #[error("Combine failed: {reason}")]
    CombineFailed { reason: String },

    #[error("Export job cannot move from {from} to {to}")]
    InvalidJobState { from: String, to: String },

    #[error("Export cancelled")]
    Cancelled,

    #[error("Preview failed: {0}")]
    Preview(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pre-export consistency failures. Checks run in declaration order and stop
/// at the first failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("timeline is empty, add at least one track")]
    NoTracks,

    #[error("timeline has no clips, add at least one clip")]
    NoClips,

    #[error("clips {first} and {second} overlap on track {track_id}")]
    Overlap {
        track_id: Uuid,
        first: Uuid,
        second: Uuid,
    },
}

/// Result type alias for Splice operations.
pub type Result<T> = std::result::Result<T, SpliceError>;
