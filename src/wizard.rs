//! Wizard flow controller.
//!
//! ```text
//! Upload ──proceed──▶ Configure ──confirm (ok)──────────────▶ Process ──done──▶ Result
//!    ▲                  │  ▲   └─confirm (mismatch)─▶ Optimize ──accept/ignore──▲     │
//!    └──────back────────┘  └──────────back─────────────┘                              │
//!    ▲                                                                                │
//!    └─────────────────────────────────reset──────────────────────────────────────────┘
//! ```
//!
//! The session owns the selected media handle, the script and both settings
//! values. The [`DurationAnalysis`] is derived from them and refreshed after
//! every change to an input.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::analysis::{DurationAnalysis, DurationStatus};
use crate::error::{DubError, Result};
use crate::media::MediaHandle;
use crate::pipeline::PipelineReport;
use crate::rewrite::RewriteMode;
use crate::settings::{SubtitleSettings, SubtitleUpdate, VoiceSettings, VoiceUpdate};

/// Scripts must be longer than this many characters to leave the upload step.
pub const MIN_SCRIPT_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    Upload = 1,
    Configure = 2,
    Optimize = 3,
    Process = 4,
    Result = 5,
}

impl Step {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::Upload => "Upload",
            Step::Configure => "Configure",
            Step::Optimize => "Optimize",
            Step::Process => "Process",
            Step::Result => "Result",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

#[derive(Debug)]
pub struct WizardSession {
    step: Step,
    media: Option<MediaHandle>,
    script: String,
    voice: VoiceSettings,
    subtitle: SubtitleSettings,
    analysis: DurationAnalysis,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new(VoiceSettings::default(), SubtitleSettings::default())
    }
}

impl WizardSession {
    pub fn new(voice: VoiceSettings, subtitle: SubtitleSettings) -> Self {
        Self {
            step: Step::Upload,
            media: None,
            script: String::new(),
            voice,
            subtitle,
            analysis: DurationAnalysis::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn media(&self) -> Option<&MediaHandle> {
        self.media.as_ref()
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn voice(&self) -> &VoiceSettings {
        &self.voice
    }

    pub fn subtitle(&self) -> &SubtitleSettings {
        &self.subtitle
    }

    pub fn analysis(&self) -> &DurationAnalysis {
        &self.analysis
    }

    /// Measured duration of the selected media, 0 when nothing is selected
    pub fn video_duration(&self) -> f64 {
        self.media.as_ref().map(MediaHandle::duration).unwrap_or(0.0)
    }

    fn require(&self, step: Step, action: &'static str) -> Result<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(DubError::InvalidTransition { from: self.step, action })
        }
    }

    fn go_to(&mut self, step: Step) -> Step {
        debug!("Wizard step {} -> {}", self.step, step);
        self.step = step;
        step
    }

    fn refresh_analysis(&mut self) {
        self.analysis =
            DurationAnalysis::compute(&self.script, self.voice.speed, self.video_duration());
        debug!(
            "Duration analysis: video {:.2}s, audio {:.2}s, diff {:.2}s -> {}",
            self.analysis.video_duration,
            self.analysis.audio_duration,
            self.analysis.diff,
            self.analysis.status
        );
    }

    /// Take ownership of a newly selected media file.
    ///
    /// Returns the handle it replaces; dropping that releases it.
    pub fn select_media(&mut self, handle: MediaHandle) -> Result<Option<MediaHandle>> {
        self.require(Step::Upload, "select media")?;
        info!("Selected media {} ({:.2}s)", handle.file_name(), handle.duration());
        let previous = self.media.replace(handle);
        self.refresh_analysis();
        Ok(previous)
    }

    /// Replace the script text. Allowed on the upload and optimize steps.
    pub fn set_script<S: Into<String>>(&mut self, script: S) -> Result<()> {
        if !matches!(self.step, Step::Upload | Step::Optimize) {
            return Err(DubError::InvalidTransition { from: self.step, action: "edit the script" });
        }
        self.script = script.into();
        self.refresh_analysis();
        Ok(())
    }

    pub fn update_voice(&mut self, update: VoiceUpdate) -> Result<()> {
        self.require(Step::Configure, "change voice settings")?;
        self.voice = self.voice.apply(update);
        if update.affects_duration() {
            self.refresh_analysis();
        }
        Ok(())
    }

    pub fn update_subtitle(&mut self, update: SubtitleUpdate) -> Result<()> {
        self.require(Step::Configure, "change subtitle settings")?;
        self.subtitle = self.subtitle.apply(update);
        Ok(())
    }

    /// Whether the upload step's proceed action is enabled
    pub fn can_proceed(&self) -> bool {
        self.step == Step::Upload
            && self.media.is_some()
            && self.script.chars().count() > MIN_SCRIPT_CHARS
    }

    /// Upload -> Configure
    pub fn proceed(&mut self) -> Result<Step> {
        self.require(Step::Upload, "proceed to configuration")?;
        if self.media.is_none() {
            return Err(DubError::ProceedBlocked("no media selected".to_string()));
        }
        if self.script.chars().count() <= MIN_SCRIPT_CHARS {
            return Err(DubError::ProceedBlocked(format!(
                "script must be longer than {} characters",
                MIN_SCRIPT_CHARS
            )));
        }
        Ok(self.go_to(Step::Configure))
    }

    /// Configure -> Process when durations match, otherwise -> Optimize
    pub fn confirm_configuration(&mut self) -> Result<Step> {
        self.require(Step::Configure, "confirm configuration")?;
        self.refresh_analysis();
        let next = if self.analysis.status.is_ok() {
            Step::Process
        } else {
            info!(
                "Script needs attention: {} (diff {:.1}s)",
                self.analysis.status, self.analysis.diff
            );
            Step::Optimize
        };
        Ok(self.go_to(next))
    }

    /// Configure -> Upload, Optimize -> Configure
    pub fn back(&mut self) -> Result<Step> {
        let previous = match self.step {
            Step::Configure => Step::Upload,
            Step::Optimize => Step::Configure,
            other => return Err(DubError::InvalidTransition { from: other, action: "go back" }),
        };
        Ok(self.go_to(previous))
    }

    /// Direction a rewrite should take, available on the optimize step
    pub fn rewrite_mode(&self) -> Option<RewriteMode> {
        (self.step == Step::Optimize).then(|| RewriteMode::for_status(self.analysis.status))
    }

    /// Optimize -> Process with the rewritten script. The result is not re-validated.
    pub fn accept_rewrite<S: Into<String>>(&mut self, rewritten: S) -> Result<Step> {
        self.require(Step::Optimize, "accept a rewrite")?;
        self.script = rewritten.into();
        self.refresh_analysis();
        if self.analysis.status != DurationStatus::Ok {
            debug!("Rewritten script still classified {}", self.analysis.status);
        }
        Ok(self.go_to(Step::Process))
    }

    /// Optimize -> Process keeping the mismatched script
    pub fn ignore_warning(&mut self) -> Result<Step> {
        self.require(Step::Optimize, "ignore the duration warning")?;
        info!("Continuing despite duration status {}", self.analysis.status);
        Ok(self.go_to(Step::Process))
    }

    /// Process -> Result once the simulated pipeline has reported completion
    pub fn complete_processing(&mut self, report: &PipelineReport) -> Result<Step> {
        self.require(Step::Process, "complete processing")?;
        if !report.is_complete() {
            return Err(DubError::ProceedBlocked(format!(
                "processing stopped at {}%",
                report.final_progress
            )));
        }
        Ok(self.go_to(Step::Result))
    }

    /// Back to upload with no media and an empty script.
    ///
    /// Voice and subtitle settings are kept. Returns the released handle.
    pub fn reset(&mut self) -> Option<MediaHandle> {
        info!("Resetting wizard session");
        self.step = Step::Upload;
        self.script.clear();
        self.analysis = DurationAnalysis::default();
        self.media.take()
    }
}
