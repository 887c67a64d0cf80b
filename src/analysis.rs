//! Script/video duration reconciliation.
//!
//! Spoken duration is estimated from the number of non-whitespace characters
//! in the script and the voice speed multiplier, then compared against the
//! measured video duration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters spoken per second at speed 1.0.
pub const BASE_CHARS_PER_SECOND: f64 = 5.0;

/// Smallest speed multiplier used for estimation; anything at or below zero is raised to it.
pub const MIN_SPEED_MULTIPLIER: f64 = 0.01;

/// `diff` strictly below this means the narration overruns the video.
pub const TOO_LONG_THRESHOLD: f64 = -2.0;

/// `diff` at or above this means the narration leaves trailing silence.
pub const TOO_SHORT_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DurationStatus {
    #[default]
    Ok,
    TooLong,
    TooShort,
}

impl DurationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::TooLong => "too_long",
            Self::TooShort => "too_short",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for DurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived comparison of estimated narration length against the video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DurationAnalysis {
    pub video_duration: f64,
    /// Estimated, not measured
    pub audio_duration: f64,
    /// `video_duration - audio_duration`
    pub diff: f64,
    pub status: DurationStatus,
}

impl DurationAnalysis {
    /// Recompute the analysis from its three inputs.
    pub fn compute(script: &str, speed: f64, video_duration: f64) -> Self {
        let audio_duration = estimate_audio_duration(script, speed);
        let diff = video_duration - audio_duration;

        Self {
            video_duration,
            audio_duration,
            diff,
            status: classify(diff),
        }
    }
}

impl fmt::Display for DurationAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: video {}, audio {}, diff {:+.1}s",
            self.status,
            format_time(self.video_duration),
            format_time(self.audio_duration),
            self.diff
        )
    }
}

/// Number of characters that count towards spoken length.
pub fn clean_length(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Estimate spoken duration in seconds for `text` read at `speed`.
pub fn estimate_audio_duration(text: &str, speed: f64) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let speed = if speed.is_finite() && speed > 0.0 {
        speed.max(MIN_SPEED_MULTIPLIER)
    } else {
        MIN_SPEED_MULTIPLIER
    };

    clean_length(text) as f64 / (BASE_CHARS_PER_SECOND * speed)
}

/// Classify `diff = video - audio`.
pub fn classify(diff: f64) -> DurationStatus {
    if diff < TOO_LONG_THRESHOLD {
        DurationStatus::TooLong
    } else if diff >= TOO_SHORT_THRESHOLD {
        DurationStatus::TooShort
    } else {
        DurationStatus::Ok
    }
}

/// Format seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;

    format!("{}:{:02}", minutes, secs)
}
