//! Build a timeline by appending media files to one track.

use std::path::PathBuf;

use splice_core::{EditorConfig, TrackKind};
use splice_editor::EditorSession;
use splice_timeline::{ClipOptions, TrackOptions};

pub async fn run(
    config: EditorConfig,
    output: PathBuf,
    files: Vec<PathBuf>,
    kind: String,
    preset: String,
) -> anyhow::Result<()> {
    let kind: TrackKind = kind.parse()?;
    let preset = super::parse_preset(&preset)?;
    let mut session = EditorSession::with_ffmpeg(config, preset);

    let track = session.add_track(kind, TrackOptions::default())?;
    for file in &files {
        session
            .add_clip(track, file, ClipOptions::default())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to add {}: {e}", file.display()))?;
        println!("  + {}", file.display());
    }

    session.save(&output)?;
    println!(
        "Wrote {} ({} clip(s), {})",
        output.display(),
        session.timeline().clip_count(),
        session.timeline().duration()
    );
    Ok(())
}
