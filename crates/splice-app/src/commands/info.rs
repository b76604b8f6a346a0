//! Show timeline information.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let file = super::load_timeline(&path)?;
    let timeline = &file.timeline;
    let settings = timeline.settings();

    println!("Timeline: {}", path.display());
    println!("  Format version: {} (written by {})", file.version, file.app_version);
    println!(
        "  Canvas: {}x{} @ {}fps, {} Hz / {} ch",
        settings.width,
        settings.height,
        settings.frame_rate,
        settings.audio_sample_rate,
        settings.audio_channels
    );
    println!("  Duration: {}", timeline.duration());
    println!();

    println!("Tracks:");
    for track in timeline.tracks() {
        let mut flags = Vec::new();
        if track.muted {
            flags.push("muted");
        }
        if track.locked {
            flags.push("locked");
        }
        println!(
            "  {} [{}] {} clip(s), volume {:.2} {}",
            track.name,
            track.kind(),
            track.clip_count(),
            track.volume(),
            flags.join(" ")
        );
        for clip in track.clips() {
            println!(
                "    {} {} -> {} (source {} - {}) {}",
                clip.id,
                clip.timeline_start(),
                clip.timeline_end(),
                clip.source_start(),
                clip.source_end(),
                clip.source.path.display()
            );
        }
    }
    Ok(())
}
