//! Splice CLI - timeline assembly and export from the command line.
//!
//! Usage:
//!   splice probe <FILE>                       Show what ffprobe reports
//!   splice info <TIMELINE>                    Summarize a timeline file
//!   splice validate <TIMELINE>                Check a timeline is exportable
//!   splice assemble <OUT> <FILES>...          Build a timeline from files
//!   splice export <TIMELINE> -o <OUT>         Render a timeline
//!   splice preview <TIMELINE> --at <SECS>     Grab a single frame

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use splice_core::EditorConfig;

mod commands;

#[derive(Parser)]
#[command(name = "splice", about = "Multi-track timeline editing and export", version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a media file
    Probe {
        /// Media file to inspect
        file: PathBuf,

        /// Print the probe result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show timeline information
    Info {
        /// Timeline file
        timeline: PathBuf,
    },

    /// Validate a timeline for export
    Validate {
        /// Timeline file
        timeline: PathBuf,
    },

    /// Append media files, in order, to a single new track
    Assemble {
        /// Timeline file to write
        output: PathBuf,

        /// Media files to append
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Track kind: video, audio or both
        #[arg(long, default_value = "both")]
        kind: String,

        /// Canvas preset: basic, high-quality, social-media, course
        #[arg(long, default_value = "basic")]
        preset: String,
    },

    /// Export a timeline to a video file
    Export {
        /// Timeline file
        timeline: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output preset: basic, high-quality, social-media, course
        #[arg(long, default_value = "basic")]
        preset: String,

        /// Override the preset's constant rate factor (0-51)
        #[arg(long)]
        crf: Option<u8>,

        /// Refuse to replace an existing output file
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Render the frame at a timeline position to an image
    Preview {
        /// Timeline file
        timeline: PathBuf,

        /// Timeline position in seconds
        #[arg(long)]
        at: f64,

        /// Image path (defaults to the temp directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EditorConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?,
        None => EditorConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    splice_core::logging::init_logging(&config.logging);
    tracing::debug!(temp_dir = %config.temp_dir.display(), "Configuration loaded");

    match cli.command {
        Commands::Probe { file, json } => commands::probe::run(&config, file, json).await,
        Commands::Info { timeline } => commands::info::run(timeline),
        Commands::Validate { timeline } => commands::validate::run(timeline),
        Commands::Assemble {
            output,
            files,
            kind,
            preset,
        } => commands::assemble::run(config, output, files, kind, preset).await,
        Commands::Export {
            timeline,
            output,
            preset,
            crf,
            no_overwrite,
        } => commands::export::run(config, timeline, output, preset, crf, !no_overwrite).await,
        Commands::Preview {
            timeline,
            at,
            output,
        } => commands::preview::run(config, timeline, at, output).await,
    }
}
