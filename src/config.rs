use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DubError, Result};
use crate::settings::{SubtitleSettings, VoiceSettings};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rewrite: RewriteConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Voice settings a new session starts with
    #[serde(default)]
    pub voice: VoiceSettings,
    /// Subtitle settings a new session starts with
    #[serde(default)]
    pub subtitle: SubtitleSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Base URL of the generative language API
    pub endpoint: String,
    /// Model used for script rewriting
    pub model: String,
    /// API key; when absent it is read from `api_key_env`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Transport timeout for a single request
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffprobe binary
    pub ffprobe_path: String,
}

/// Per-increment delays of the simulated processing sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Audio generation phase (progress 0 to 30)
    pub audio_step_ms: u64,
    /// Merge phase (progress 30 to 70)
    pub merge_step_ms: u64,
    /// Subtitle phase (progress 70 to 100)
    pub subtitle_step_ms: u64,
    /// Pause at 100 before completion fires
    pub completion_hold_ms: u64,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_output_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

impl RewriteConfig {
    /// The configured key, falling back to the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            audio_step_ms: 50,
            merge_step_ms: 60,
            subtitle_step_ms: 30,
            completion_hold_ms: 500,
        }
    }
}

impl PipelineConfig {
    /// No delays at all; used by tests and dry runs
    pub fn instant() -> Self {
        Self {
            audio_step_ms: 0,
            merge_step_ms: 0,
            subtitle_step_ms: 0,
            completion_hold_ms: 0,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DubError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SubtitlePreset, VoiceId};

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.rewrite.model = "gemini-2.5-pro".to_string();
        config.voice.voice_id = VoiceId::PresenterFemale;
        config.subtitle.preset = SubtitlePreset::Outline;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.rewrite.model, "gemini-2.5-pro");
        assert_eq!(loaded.voice, config.voice);
        assert_eq!(loaded.subtitle, config.subtitle);
        assert_eq!(loaded.pipeline.merge_step_ms, 60);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[media]\nffprobe_path = \"/usr/local/bin/ffprobe\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.media.ffprobe_path, "/usr/local/bin/ffprobe");
        assert_eq!(config.rewrite.model, "gemini-2.5-flash");
        assert_eq!(config.pipeline.completion_hold_ms, 500);
        assert_eq!(config.voice, VoiceSettings::default());
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            "[rewrite]\napi_key = \"abc\"\n\n\
             [pipeline]\ncompletion_hold_ms = 0\n\n\
             [voice]\nspeed = 1.5\n\n\
             [subtitle]\npreset = \"modern\"\n",
        )
        .unwrap();

        assert_eq!(config.rewrite.api_key.as_deref(), Some("abc"));
        assert_eq!(config.rewrite.model, "gemini-2.5-flash");
        assert_eq!(config.rewrite.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.rewrite.max_output_tokens, 1000);
        assert_eq!(config.rewrite.timeout_secs, 120);

        assert_eq!(config.pipeline.completion_hold_ms, 0);
        assert_eq!(config.pipeline.audio_step_ms, 50);

        assert_eq!(config.voice.speed, 1.5);
        assert_eq!(config.voice.volume, 100.0);
        assert_eq!(config.voice.voice_id, VoiceId::FemaleWarm);

        assert_eq!(config.subtitle.preset, SubtitlePreset::Modern);
        assert!(config.subtitle.show);
        assert_eq!(config.subtitle.font_size, 10);
        assert_eq!(config.media.ffprobe_path, "ffprobe");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pipeline\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(DubError::Config(_))));
        assert!(matches!(
            Config::from_file(dir.path().join("missing.toml")),
            Err(DubError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = RewriteConfig {
            api_key: Some("secret".to_string()),
            api_key_env: "SMARTDUB_TEST_UNSET_KEY".to_string(),
            ..RewriteConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("secret"));

        let blank = RewriteConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "SMARTDUB_TEST_UNSET_KEY".to_string(),
            ..RewriteConfig::default()
        };
        assert_eq!(blank.resolve_api_key(), None);
    }
}
