//! Media kind carried by tracks and clips.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SpliceError;

/// Kind of track. Fixed when the track is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Both,
}

impl TrackKind {
    /// Whether a clip coming from a `source` track may land on a track of
    /// this kind. `Both` accepts anything; otherwise the kinds must match.
    pub fn accepts(self, source: TrackKind) -> bool {
        self == TrackKind::Both || self == source
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackKind {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "both" => Ok(Self::Both),
            other => Err(SpliceError::InvalidParameter(format!(
                "unknown track kind: {other:?}"
            ))),
        }
    }
}
