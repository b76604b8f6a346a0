//! Grab the frame at a timeline position.

use std::path::PathBuf;

use splice_core::{EditorConfig, RationalTime};
use splice_editor::EditorPreset;

pub async fn run(
    config: EditorConfig,
    timeline: PathBuf,
    at: f64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let at = RationalTime::try_from_seconds_f64(at)
        .filter(|t| !t.is_negative())
        .ok_or_else(|| anyhow::anyhow!("Invalid position: {at}"))?;
    let session = super::open_session(config, EditorPreset::Basic, &timeline)?;

    let path = session.generate_preview(at, output).await?;
    println!("Preview at {at}: {}", path.display());
    Ok(())
}
