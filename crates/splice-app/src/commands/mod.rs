pub mod assemble;
pub mod export;
pub mod info;
pub mod preview;
pub mod probe;
pub mod validate;

use std::path::Path;

use splice_core::EditorConfig;
use splice_editor::{EditorPreset, EditorSession};
use splice_timeline::TimelineFile;

pub(crate) fn parse_preset(name: &str) -> anyhow::Result<EditorPreset> {
    name.parse::<EditorPreset>().map_err(|e| {
        anyhow::anyhow!("{e}. Use: basic, high-quality, social-media, course")
    })
}

pub(crate) fn load_timeline(path: &Path) -> anyhow::Result<TimelineFile> {
    TimelineFile::load_from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load timeline {}: {e}", path.display()))
}

/// An ffmpeg-backed session with the timeline at `path` loaded.
pub(crate) fn open_session(
    config: EditorConfig,
    preset: EditorPreset,
    path: &Path,
) -> anyhow::Result<EditorSession> {
    let mut session = EditorSession::with_ffmpeg(config, preset);
    session
        .open(path)
        .map_err(|e| anyhow::anyhow!("Failed to load timeline {}: {e}", path.display()))?;
    Ok(session)
}
