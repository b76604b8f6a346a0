//! Render a timeline to a video file.

use std::io::Write;
use std::path::PathBuf;

use splice_core::EditorConfig;
use splice_editor::events::ExportProgress;

pub async fn run(
    config: EditorConfig,
    timeline: PathBuf,
    output: PathBuf,
    preset: String,
    crf: Option<u8>,
    overwrite: bool,
) -> anyhow::Result<()> {
    let preset = super::parse_preset(&preset)?;
    let session = super::open_session(config, preset, &timeline)?;

    let mut settings = session.default_export_settings(output.clone());
    if let Some(crf) = crf {
        settings = settings.with_crf(crf);
    }
    settings.overwrite = overwrite;

    println!("Exporting timeline at: {}", timeline.display());
    println!("  Output: {}", output.display());
    println!("  Preset: {preset}");
    println!(
        "  Video: {} (crf {}, {}), audio: {} {} kbps",
        settings.video_codec.ffmpeg_encoder(),
        settings.crf,
        settings.preset,
        settings.audio_codec.ffmpeg_encoder(),
        settings.audio_bitrate_kbps
    );

    session.events().subscribe::<ExportProgress, _>(|p| {
        print!("\r  Progress: {:.1}%  ", p.percent);
        std::io::stdout().flush().ok();
    });

    let summary = session.export(settings).await?;
    println!();
    println!("Export complete: {}", summary.output_path.display());
    println!(
        "  {} clip(s) on {} track(s), {} long, {} bytes in {:.1}s",
        summary.clip_count,
        summary.track_count,
        summary.duration,
        summary.file_size,
        summary.processing_time.as_secs_f64()
    );
    Ok(())
}
