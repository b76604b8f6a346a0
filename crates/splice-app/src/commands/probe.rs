//! Probe a media file.

use std::path::PathBuf;

use splice_core::EditorConfig;
use splice_media::{FfprobeProber, MediaProber, ToolLocations};

pub async fn run(config: &EditorConfig, file: PathBuf, json: bool) -> anyhow::Result<()> {
    let tools = ToolLocations::resolve(&config.tools);
    let info = FfprobeProber::new(tools.ffprobe).probe(&file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File: {}", info.path.display());
    println!("  Format: {}", info.format);
    println!("  Duration: {}", info.duration);
    for video in &info.video_streams {
        let fps = video
            .frame_rate
            .map(|r| format!("{r} fps"))
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  Video #{}: {} {}x{} @ {fps}",
            video.index, video.codec, video.width, video.height
        );
    }
    for audio in &info.audio_streams {
        println!(
            "  Audio #{}: {} {} Hz, {} ch",
            audio.index, audio.codec, audio.sample_rate, audio.channels
        );
    }
    Ok(())
}
