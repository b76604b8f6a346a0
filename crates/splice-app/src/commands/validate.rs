//! Check that a timeline can be exported.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating timeline at: {}", path.display());
    let file = super::load_timeline(&path)?;
    let timeline = &file.timeline;

    println!("  Tracks: {}", timeline.tracks().len());
    println!("  Clips: {}", timeline.clip_count());
    println!("  Duration: {}", timeline.duration());

    let missing: Vec<_> = timeline
        .tracks()
        .iter()
        .flat_map(|t| t.clips())
        .filter(|c| !c.source.path.exists())
        .map(|c| c.source.path.clone())
        .collect();

    match timeline.validate() {
        Ok(()) if missing.is_empty() => {
            println!("\nTimeline is valid.");
            Ok(())
        }
        Ok(()) => {
            println!("\nMissing sources:");
            for path in &missing {
                println!("  - {}", path.display());
            }
            anyhow::bail!("{} source file(s) missing", missing.len())
        }
        Err(e) => anyhow::bail!("Timeline is not exportable: {e}"),
    }
}
