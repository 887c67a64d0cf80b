// Script rewriting through a generative-text service
//
// The wizard only needs "text in, text out, or failure". Implementations:
// - Gemini: Google generateContent HTTP API

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::{DurationAnalysis, DurationStatus};
use crate::config::RewriteConfig;
use crate::error::Result;

/// Direction in which the script has to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    Shorten,
    Extend,
}

impl RewriteMode {
    /// `Shorten` for narration that overruns the video, `Extend` otherwise.
    pub fn for_status(status: DurationStatus) -> Self {
        match status {
            DurationStatus::TooLong => Self::Shorten,
            DurationStatus::Ok | DurationStatus::TooShort => Self::Extend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shorten => "shorten",
            Self::Extend => "extend",
        }
    }
}

impl fmt::Display for RewriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub script: String,
    /// Video duration the script should fit
    pub target_seconds: f64,
    /// Current estimated narration duration
    pub current_seconds: f64,
    pub mode: RewriteMode,
}

impl RewriteRequest {
    pub fn from_analysis(script: &str, analysis: &DurationAnalysis) -> Self {
        Self {
            script: script.to_string(),
            target_seconds: analysis.video_duration,
            current_seconds: analysis.audio_duration,
            mode: RewriteMode::for_status(analysis.status),
        }
    }
}

/// Main trait for script rewriting
#[async_trait]
pub trait ScriptRewriter: Send + Sync {
    /// Rewrite the script towards the requested duration
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String>;
}

/// Factory for creating rewriter instances
pub struct RewriterFactory;

impl RewriterFactory {
    pub fn create_rewriter(config: RewriteConfig) -> Result<Box<dyn ScriptRewriter>> {
        Ok(Box::new(gemini::GeminiRewriter::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_status() {
        assert_eq!(RewriteMode::for_status(DurationStatus::TooLong), RewriteMode::Shorten);
        assert_eq!(RewriteMode::for_status(DurationStatus::TooShort), RewriteMode::Extend);
        assert_eq!(RewriteMode::for_status(DurationStatus::Ok), RewriteMode::Extend);
    }

    #[test]
    fn test_request_from_analysis() {
        let script = "a".repeat(100);
        let analysis = DurationAnalysis::compute(&script, 1.0, 25.0);
        let request = RewriteRequest::from_analysis(&script, &analysis);

        assert_eq!(request.mode, RewriteMode::Extend);
        assert_eq!(request.target_seconds, 25.0);
        assert_eq!(request.current_seconds, 20.0);
        assert_eq!(request.script, script);
    }
}
