use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{MediaCommandBuilder, MediaProbeTrait};
use crate::config::MediaConfig;
use crate::error::{DubError, Result};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Duration probe backed by ffprobe
pub struct FfprobeProbe {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfprobeProbe {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.ffprobe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProbeTrait for FfprobeProbe {
    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        info!("Probing media duration: {}", media_path.display());

        if !media_path.exists() {
            return Err(DubError::FileNotFound(media_path.display().to_string()));
        }

        let output = self
            .command_builder
            .probe_duration(media_path)
            .execute()
            .await
            .map_err(|e| match e {
                DubError::CommandFailed { .. } => {
                    warn!("ffprobe rejected {}: {}", media_path.display(), e);
                    DubError::MediaUnreadable(media_path.display().to_string())
                }
                other => other,
            })?;

        let duration = parse_duration(&output)
            .ok_or_else(|| DubError::MediaUnreadable(media_path.display().to_string()))?;

        info!("Media duration: {:.2}s", duration);
        Ok(duration)
    }

    async fn check_availability(&self) -> Result<()> {
        let output = self
            .command_builder
            .version_check()
            .execute()
            .await
            .map_err(|e| DubError::Media(format!("Media probe not found: {}", e)))?;

        debug!(
            "{} available: {}",
            self.config.ffprobe_path,
            output.lines().next().unwrap_or("unknown version")
        );
        Ok(())
    }
}

/// Extract `format.duration` from ffprobe JSON output.
///
/// Returns `None` for missing, non-numeric, non-finite or negative durations.
pub fn parse_duration(json: &str) -> Option<f64> {
    let output: FfprobeOutput = serde_json::from_str(json).ok()?;
    let duration = output.format?.duration?.trim().parse::<f64>().ok()?;

    (duration.is_finite() && duration >= 0.0).then_some(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json =
            r#"{"format": {"filename": "clip.mp4", "duration": "25.480000", "size": "1024"}}"#;
        assert_eq!(parse_duration(json), Some(25.48));
    }

    #[test]
    fn test_parse_duration_rejects_bad_values() {
        assert_eq!(parse_duration(r#"{"format": {}}"#), None);
        assert_eq!(parse_duration(r#"{}"#), None);
        assert_eq!(parse_duration(r#"{"format": {"duration": "N/A"}}"#), None);
        assert_eq!(parse_duration(r#"{"format": {"duration": "-1.0"}}"#), None);
        assert_eq!(parse_duration(r#"{"format": {"duration": "inf"}}"#), None);
        assert_eq!(parse_duration("not json"), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let probe = FfprobeProbe::new(MediaConfig::default());
        let result = probe.probe_duration(Path::new("/definitely/not/here.mp4")).await;
        assert!(matches!(result, Err(DubError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_probe_binary_is_not_blamed_on_the_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let probe = FfprobeProbe::new(MediaConfig {
            ffprobe_path: "smartdub-no-such-ffprobe".to_string(),
        });
        let result = probe.probe_duration(file.path()).await;
        assert!(matches!(result, Err(DubError::Media(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rejected_file_is_unreadable_media() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let probe = FfprobeProbe::new(MediaConfig {
            ffprobe_path: "false".to_string(),
        });
        let result = probe.probe_duration(file.path()).await;
        assert!(matches!(result, Err(DubError::MediaUnreadable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_without_duration_is_unreadable_media() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let probe = FfprobeProbe::new(MediaConfig {
            ffprobe_path: "true".to_string(),
        });
        let result = probe.probe_duration(file.path()).await;
        assert!(matches!(result, Err(DubError::MediaUnreadable(_))));
    }
}
