//! Pre-export consistency checks.

use splice_core::ValidationError;

use crate::track::Track;

/// Check that `tracks` can be exported.
///
/// Checks run in order and stop at the first failure: at least one track,
/// at least one clip, then no adjacent overlap inside any track.
pub fn validate(tracks: &[Track]) -> Result<(), ValidationError> {
    if tracks.is_empty() {
        return Err(ValidationError::NoTracks);
    }
    if tracks.iter().all(Track::is_empty) {
        return Err(ValidationError::NoClips);
    }
    for track in tracks {
        if let Some((first, second)) = track.first_overlap() {
            return Err(ValidationError::Overlap {
                track_id: track.id(),
                first: first.id,
                second: second.id,
            });
        }
    }
    Ok(())
}
