//! Splice Timeline - Timeline data model
//!
//! Implements the editable timeline:
//! - Tracks holding time-ordered clips
//! - Clip operations that keep placement invariants (trim, split, move)
//! - Pre-export validation
//! - Snapshot history for undo/redo
//! - Versioned JSON timeline files

pub mod clip;
pub mod history;
pub mod serialization;
pub mod timeline;
pub mod track;
pub mod validate;

pub use clip::{Clip, ClipSource, Transition, TransitionKind};
pub use history::History;
pub use serialization::TimelineFile;
pub use timeline::{
    ClipOptions, SplitOutcome, Timeline, TimelineSettings, TimelineSnapshot, TrimOptions,
    TrimOutcome,
};
pub use track::{Track, TrackOptions};
pub use validate::validate;
