use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::analysis::{format_time, DurationStatus};
use crate::error::{DubError, Result};
use crate::pipeline::PipelineReport;
use crate::settings::{SubtitlePreset, VoiceId};
use crate::wizard::{Step, WizardSession};

const SENTENCE_TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Subtitle line shown over the result preview: the first sentence of the script.
pub fn preview_subtitle(script: &str) -> String {
    let first = script.split(SENTENCE_TERMINATORS).next().unwrap_or_default();
    format!("{}...", first.trim())
}

/// What the result step shows for a finished job
#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub video: PathBuf,
    pub video_duration: f64,
    pub estimated_audio: f64,
    pub status: DurationStatus,
    pub voice: VoiceId,
    pub speed: f64,
    pub subtitles: Option<SubtitlePreset>,
    pub preview: String,
    pub completed_at: DateTime<Utc>,
}

impl ResultSummary {
    pub fn from_session(session: &WizardSession, report: &PipelineReport) -> Result<Self> {
        if session.step() != Step::Result {
            return Err(DubError::InvalidTransition {
                from: session.step(),
                action: "show the result",
            });
        }
        let media = session
            .media()
            .ok_or_else(|| DubError::ProceedBlocked("no media selected".to_string()))?;
        let analysis = session.analysis();
        let subtitle = session.subtitle();

        Ok(Self {
            video: media.path().to_path_buf(),
            video_duration: analysis.video_duration,
            estimated_audio: analysis.audio_duration,
            status: analysis.status,
            voice: session.voice().voice_id,
            speed: session.voice().speed,
            subtitles: subtitle.show.then_some(subtitle.preset),
            preview: preview_subtitle(session.script()),
            completed_at: report.completed_at,
        })
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dubbing complete")?;
        writeln!(f, "  Video:      {}", self.video.display())?;
        writeln!(
            f,
            "  Duration:   video {} / narration {} ({})",
            format_time(self.video_duration),
            format_time(self.estimated_audio),
            self.status
        )?;
        writeln!(f, "  Voice:      {} at {:.1}x", self.voice, self.speed)?;
        match self.subtitles {
            Some(preset) => writeln!(f, "  Subtitles:  {}", preset)?,
            None => writeln!(f, "  Subtitles:  off")?,
        }
        writeln!(f, "  Preview:    {}", self.preview)?;
        write!(f, "  Finished:   {}", self.completed_at.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}
