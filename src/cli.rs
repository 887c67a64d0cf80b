use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Script text given inline or read from a file
#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ScriptSource {
    /// Narration script text
    #[arg(short, long)]
    pub script: Option<String>,

    /// File containing the narration script
    #[arg(long)]
    pub script_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure and run a dubbing job for a video
    Dub {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        script: ScriptSource,

        /// Voice speed multiplier (0.5 to 2.0)
        #[arg(long)]
        speed: Option<f64>,

        /// Volume (0 to 100)
        #[arg(long)]
        volume: Option<f64>,

        /// Pitch shift (-10 to 10)
        #[arg(long, allow_hyphen_values = true)]
        pitch: Option<i32>,

        /// Voice identifier (see `voices`)
        #[arg(long)]
        voice: Option<String>,

        /// Emotion (see `voices`), or "none"
        #[arg(long)]
        emotion: Option<String>,

        /// Subtitle preset: classic, modern or outline
        #[arg(long)]
        preset: Option<String>,

        /// Subtitle font size
        #[arg(long)]
        font_size: Option<u32>,

        /// Subtitle text alignment: left, center or right
        #[arg(long)]
        align: Option<String>,

        /// Do not burn in subtitles
        #[arg(long)]
        no_subtitles: bool,

        /// Rewrite the script with the AI service when its length does not fit
        #[arg(long)]
        optimize: bool,

        /// Continue even if the script length does not fit the video
        #[arg(long)]
        ignore_warning: bool,
    },

    /// Estimate narration length and compare it with a video
    Analyze {
        #[command(flatten)]
        script: ScriptSource,

        /// Video file to measure
        #[arg(short, long, conflicts_with = "duration")]
        input: Option<PathBuf>,

        /// Video duration in seconds, instead of probing a file
        #[arg(short, long)]
        duration: Option<f64>,

        /// Voice speed multiplier
        #[arg(long, default_value = "1.0")]
        speed: f64,
    },

    /// Print the duration of a media file
    Probe {
        /// Input media file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List subtitle presets
    Presets,

    /// List selectable voices and emotions
    Voices,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration to a file
    Init {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
