//! SmartDub - Video Dubbing Job Configurator
//!
//! Command-line entry point. Drives the dubbing wizard from flags, and offers
//! helpers to analyze scripts, probe media and inspect presets.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smartdub::analysis::{format_time, DurationAnalysis};
use smartdub::cli::{Args, Commands, ConfigAction, ScriptSource};
use smartdub::config::Config;
use smartdub::error::DubError;
use smartdub::media::MediaProbeFactory;
use smartdub::rewrite::RewriteMode;
use smartdub::settings::{
    Alignment, Emotion, SubtitlePreset, SubtitleUpdate, VoiceId, VoiceUpdate,
};
use smartdub::workflow::{DubPlan, ProgressBarObserver, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting SmartDub");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Dub {
            input,
            script,
            speed,
            volume,
            pitch,
            voice,
            emotion,
            preset,
            font_size,
            align,
            no_subtitles,
            optimize,
            ignore_warning,
        } => {
            info!("Configuring dubbing job for: {}", input.display());

            let mut voice_updates = Vec::new();
            if let Some(speed) = speed {
                voice_updates.push(VoiceUpdate::Speed(speed));
            }
            if let Some(volume) = volume {
                voice_updates.push(VoiceUpdate::Volume(volume));
            }
            if let Some(pitch) = pitch {
                voice_updates.push(VoiceUpdate::Pitch(pitch));
            }
            if let Some(voice) = voice {
                voice_updates.push(VoiceUpdate::Voice(parse_voice(&voice)?));
            }
            if let Some(emotion) = emotion {
                voice_updates.push(VoiceUpdate::Emotion(parse_emotion(&emotion)?));
            }

            let mut subtitle_updates = Vec::new();
            if no_subtitles {
                subtitle_updates.push(SubtitleUpdate::Show(false));
            }
            if let Some(preset) = preset {
                subtitle_updates.push(SubtitleUpdate::Preset(parse_preset(&preset)?));
            }
            if let Some(size) = font_size {
                subtitle_updates.push(SubtitleUpdate::FontSize(size));
            }
            if let Some(align) = align {
                subtitle_updates.push(SubtitleUpdate::Alignment(parse_alignment(&align)?));
            }

            let plan = DubPlan {
                video: input,
                script: read_script(&script)?,
                voice_updates,
                subtitle_updates,
                optimize,
                ignore_warning,
            };

            let workflow = Workflow::new(config)?;
            let observer = ProgressBarObserver::new();
            let (_session, summary) = workflow.run(&plan, &observer).await?;
            observer.finish();

            println!("\n{}", summary);
        }
        Commands::Analyze { script, input, duration, speed } => {
            let script = read_script(&script)?;

            let video_duration = match (input, duration) {
                (Some(input), _) => {
                    let probe = MediaProbeFactory::create_probe(config.media.clone());
                    probe.probe_duration(&input).await?
                }
                (None, Some(duration)) => duration,
                (None, None) => {
                    return Err(DubError::Config(
                        "Either --input or --duration is required".to_string(),
                    )
                    .into());
                }
            };

            let analysis = DurationAnalysis::compute(&script, speed, video_duration);
            println!(
                "Video duration:      {} ({:.2}s)",
                format_time(analysis.video_duration),
                analysis.video_duration
            );
            println!(
                "Estimated narration: {} ({:.2}s)",
                format_time(analysis.audio_duration),
                analysis.audio_duration
            );
            println!("Difference:          {:+.2}s", analysis.diff);
            println!("Status:              {}", analysis.status);
            if !analysis.status.is_ok() {
                println!(
                    "Suggested rewrite:   {}",
                    RewriteMode::for_status(analysis.status)
                );
            }
        }
        Commands::Probe { input } => {
            let probe = MediaProbeFactory::create_probe(config.media.clone());
            probe.check_availability().await?;
            let duration = probe.probe_duration(&input).await?;
            println!("{}: {} ({:.3}s)", input.display(), format_time(duration), duration);
        }
        Commands::Presets => {
            println!("\nSubtitle Presets:");
            println!(
                "{:<10} {:<16} {:<8} {:<8} {:<6} {:<40}",
                "Name", "Font", "BgOpac", "Stroke", "Bold", "Description"
            );
            println!("{}", "-".repeat(92));

            for preset in SubtitlePreset::NAMED {
                if let Some(style) = preset.style() {
                    println!(
                        "{:<10} {:<16} {:<8} {:<8} {:<6} {:<40}",
                        preset.as_str(),
                        style.font_family,
                        style.background_opacity,
                        style.stroke_width,
                        style.is_bold,
                        preset.description()
                    );
                }
            }
        }
        Commands::Voices => {
            println!("\nStandard Voices:");
            for voice in VoiceId::STANDARD {
                println!("  {:<20} {}", voice.as_str(), voice.label());
            }
            println!("\nCustom Voices:");
            for voice in VoiceId::CUSTOM {
                println!("  {:<20} {}", voice.as_str(), voice.label());
            }
            println!("\nEmotions:");
            let emotions: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
            println!("  {}", emotions.join(", "));
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config)?;
                println!("{}", content);
            }
            ConfigAction::Init { output, force } => {
                if output.exists() && !force {
                    return Err(DubError::Config(format!(
                        "{} already exists (use --force to overwrite)",
                        output.display()
                    ))
                    .into());
                }
                Config::default().save_to_file(&output)?;
                println!("Wrote default configuration to {}", output.display());
            }
        },
    }

    info!("SmartDub finished successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir: PathBuf = std::env::current_dir()?.join(".smartdub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "smartdub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("smartdub.log").display());

    Ok(())
}

/// Read the script from inline text or a file
fn read_script(source: &ScriptSource) -> Result<String> {
    match (&source.script, &source.script_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            DubError::Config(format!("Failed to read script {}: {}", path.display(), e)).into()
        }),
        (None, None) => Err(DubError::Config("A script is required".to_string()).into()),
    }
}

fn parse_voice(value: &str) -> Result<VoiceId> {
    VoiceId::from_str(value).ok_or_else(|| {
        DubError::Config(format!(
            "Unknown voice '{}'. Run `smartdub voices` for the list",
            value
        ))
        .into()
    })
}

fn parse_emotion(value: &str) -> Result<Option<Emotion>> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Emotion::from_str(value).map(Some).ok_or_else(|| {
        DubError::Config(format!(
            "Unknown emotion '{}'. Run `smartdub voices` for the list",
            value
        ))
        .into()
    })
}

fn parse_preset(value: &str) -> Result<SubtitlePreset> {
    match SubtitlePreset::from_str(value) {
        Some(preset) if preset != SubtitlePreset::Custom => Ok(preset),
        _ => Err(DubError::Config(format!(
            "Invalid preset '{}'. Valid presets: classic, modern, outline",
            value
        ))
        .into()),
    }
}

fn parse_alignment(value: &str) -> Result<Alignment> {
    Alignment::from_str(value).ok_or_else(|| {
        DubError::Config(format!(
            "Invalid alignment '{}'. Valid values: left, center, right",
            value
        ))
        .into()
    })
}
