use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{DubError, Result};
use crate::media::{MediaHandle, MediaProbeFactory, MediaProbeTrait};
use crate::pipeline::{PipelineReport, ProgressObserver, ProgressUpdate, SimulatedPipeline};
use crate::result::ResultSummary;
use crate::rewrite::{RewriteRequest, RewriterFactory, ScriptRewriter};
use crate::settings::{SubtitleUpdate, VoiceUpdate};
use crate::wizard::{Step, WizardSession};

/// Everything a non-interactive run needs to walk the wizard
#[derive(Debug, Clone, Default)]
pub struct DubPlan {
    pub video: PathBuf,
    pub script: String,
    pub voice_updates: Vec<VoiceUpdate>,
    pub subtitle_updates: Vec<SubtitleUpdate>,
    /// Ask the rewrite service to fix a duration mismatch
    pub optimize: bool,
    /// Continue with a mismatched script
    pub ignore_warning: bool,
}

pub struct Workflow {
    config: Config,
    probe: Box<dyn MediaProbeTrait>,
    rewriter: Box<dyn ScriptRewriter>,
    rewrite_in_flight: AtomicBool,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let probe = MediaProbeFactory::create_probe(config.media.clone());
        let rewriter = RewriterFactory::create_rewriter(config.rewrite.clone())?;

        Ok(Self::with_components(config, probe, rewriter))
    }

    pub fn with_components(
        config: Config,
        probe: Box<dyn MediaProbeTrait>,
        rewriter: Box<dyn ScriptRewriter>,
    ) -> Self {
        Self {
            config,
            probe,
            rewriter,
            rewrite_in_flight: AtomicBool::new(false),
        }
    }

    /// A fresh session seeded with the configured default settings
    pub fn new_session(&self) -> WizardSession {
        WizardSession::new(self.config.voice.clone(), self.config.subtitle.clone())
    }

    /// Probe a file and hand it to the session.
    ///
    /// On failure the session keeps its current selection.
    pub async fn load_media<P: AsRef<Path>>(
        &self,
        session: &mut WizardSession,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();
        if session.step() != Step::Upload {
            return Err(DubError::InvalidTransition {
                from: session.step(),
                action: "select media",
            });
        }

        let duration = self.probe.probe_duration(path).await?;
        let handle = MediaHandle::acquire(path, duration);
        // Dropping the replaced handle releases it.
        drop(session.select_media(handle)?);
        Ok(())
    }

    /// Request a rewritten script for the session's current mismatch.
    ///
    /// Only one request may be outstanding. The session is not modified.
    pub async fn optimize_script(&self, session: &WizardSession) -> Result<String> {
        if session.rewrite_mode().is_none() {
            return Err(DubError::InvalidTransition {
                from: session.step(),
                action: "request a rewrite",
            });
        }

        let _guard = InFlightGuard::acquire(&self.rewrite_in_flight)
            .ok_or(DubError::RewriteInProgress)?;

        let request = RewriteRequest::from_analysis(session.script(), session.analysis());
        let result = self.rewriter.rewrite(&request).await;

        match &result {
            Ok(text) => info!("Received rewritten script ({} characters)", text.chars().count()),
            Err(e) => warn!("Script rewrite failed: {}", e),
        }
        result
    }

    /// Run the simulated pipeline and move the session to the result step
    pub async fn process(
        &self,
        session: &mut WizardSession,
        observer: &dyn ProgressObserver,
    ) -> Result<PipelineReport> {
        if session.step() != Step::Process {
            return Err(DubError::InvalidTransition {
                from: session.step(),
                action: "start processing",
            });
        }

        let report = SimulatedPipeline::new(&self.config.pipeline).run(observer).await;
        session.complete_processing(&report)?;
        Ok(report)
    }

    /// Walk every step of the wizard for `plan`
    pub async fn run(
        &self,
        plan: &DubPlan,
        observer: &dyn ProgressObserver,
    ) -> Result<(WizardSession, ResultSummary)> {
        let mut session = self.new_session();

        // Step 1: media and script
        session.set_script(plan.script.clone())?;
        self.load_media(&mut session, &plan.video).await?;
        session.proceed()?;

        // Step 2: settings
        for update in &plan.voice_updates {
            session.update_voice(*update)?;
        }
        for update in &plan.subtitle_updates {
            session.update_subtitle(update.clone())?;
        }
        info!("Duration analysis: {}", session.analysis());

        // Step 3: only when the durations disagree
        if session.confirm_configuration()? == Step::Optimize {
            self.resolve_mismatch(&mut session, plan).await?;
        }

        // Step 4 and 5
        let report = self.process(&mut session, observer).await?;
        let summary = ResultSummary::from_session(&session, &report)?;
        Ok((session, summary))
    }

    async fn resolve_mismatch(&self, session: &mut WizardSession, plan: &DubPlan) -> Result<()> {
        warn!("Duration mismatch: {}", session.analysis());

        if plan.optimize {
            match self.optimize_script(session).await {
                Ok(rewritten) => {
                    session.accept_rewrite(rewritten)?;
                    return Ok(());
                }
                Err(e) if plan.ignore_warning => {
                    warn!("Rewrite failed ({}), continuing with the original script", e);
                }
                Err(e) => return Err(e),
            }
        }

        if plan.ignore_warning {
            session.ignore_warning()?;
            Ok(())
        } else {
            Err(DubError::DurationMismatch(*session.analysis()))
        }
    }
}

/// Holds the rewrite slot; released on drop, including when the request future is cancelled.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::SeqCst)).then_some(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Terminal progress bar for the processing step
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_progress(&self, update: ProgressUpdate) {
        self.bar.set_message(update.phase.label());
        self.bar.set_position(u64::from(update.progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DurationStatus;
    use crate::config::PipelineConfig;
    use crate::pipeline::NoopObserver;
    use crate::rewrite::RewriteMode;
    use crate::settings::{SubtitlePreset, VoiceId};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct FixedProbe(Option<f64>);

    #[async_trait]
    impl MediaProbeTrait for FixedProbe {
        async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
            self.0
                .ok_or_else(|| DubError::MediaUnreadable(media_path.display().to_string()))
        }

        async fn check_availability(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Clone)]
    struct ScriptedRewriter {
        reply: Option<String>,
        requests: Arc<Mutex<Vec<RewriteRequest>>>,
    }

    impl ScriptedRewriter {
        fn new(reply: Option<&str>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ScriptRewriter for ScriptedRewriter {
        async fn rewrite(&self, request: &RewriteRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| DubError::Rewrite("service unavailable".to_string()))
        }
    }

    fn workflow(duration: Option<f64>, rewriter: ScriptedRewriter) -> Workflow {
        let config = Config {
            pipeline: PipelineConfig::instant(),
            ..Config::default()
        };
        Workflow::with_components(config, Box::new(FixedProbe(duration)), Box::new(rewriter))
    }

    fn plan(script: &str) -> DubPlan {
        DubPlan {
            video: PathBuf::from("clip.mp4"),
            script: script.to_string(),
            ..DubPlan::default()
        }
    }

    #[tokio::test]
    async fn test_matching_script_skips_optimize() {
        let rewriter = ScriptedRewriter::new(Some("unused"));
        let flow = workflow(Some(10.0), rewriter.clone());

        let (session, summary) = flow.run(&plan(&"x".repeat(50)), &NoopObserver).await.unwrap();
        assert_eq!(session.step(), Step::Result);
        assert_eq!(summary.status, DurationStatus::Ok);
        assert!(rewriter.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_media_does_not_advance() {
        let flow = workflow(None, ScriptedRewriter::new(None));
        let mut session = flow.new_session();

        let result = flow.load_media(&mut session, "broken.mp4").await;
        assert!(matches!(result, Err(DubError::MediaUnreadable(_))));
        assert_eq!(session.step(), Step::Upload);
        assert!(session.media().is_none());
    }

    #[tokio::test]
    async fn test_failed_probe_keeps_previous_selection() {
        let good = workflow(Some(12.0), ScriptedRewriter::new(None));
        let bad = workflow(None, ScriptedRewriter::new(None));
        let mut session = good.new_session();

        good.load_media(&mut session, "good.mp4").await.unwrap();
        assert!(bad.load_media(&mut session, "bad.mp4").await.is_err());
        assert_eq!(session.media().map(|m| m.file_name()), Some("good.mp4".to_string()));
        assert_eq!(session.video_duration(), 12.0);
    }

    #[tokio::test]
    async fn test_short_script_requests_extension() {
        let rewriter = ScriptedRewriter::new(Some("y".repeat(125).as_str()));
        let flow = workflow(Some(25.0), rewriter.clone());
        let mut dub = plan(&"x".repeat(100));
        dub.optimize = true;

        let (session, _) = flow.run(&dub, &NoopObserver).await.unwrap();
        assert_eq!(session.script(), "y".repeat(125));

        let requests = rewriter.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].mode, RewriteMode::Extend);
        assert_eq!(requests[0].target_seconds, 25.0);
        assert_eq!(requests[0].current_seconds, 20.0);
    }

    #[tokio::test]
    async fn test_rewrite_failure_preserves_optimize_state() {
        let flow = workflow(Some(10.0), ScriptedRewriter::new(None));
        let mut session = flow.new_session();
        session.set_script("x".repeat(100)).unwrap();
        flow.load_media(&mut session, "clip.mp4").await.unwrap();
        session.proceed().unwrap();
        session.confirm_configuration().unwrap();

        let result = flow.optimize_script(&session).await;
        assert!(matches!(result, Err(DubError::Rewrite(_))));
        assert_eq!(session.step(), Step::Optimize);
        assert_eq!(session.script(), "x".repeat(100));

        // A later attempt is not blocked by the failed one
        assert!(matches!(flow.optimize_script(&session).await, Err(DubError::Rewrite(_))));
    }

    /// Never answers its first request; later requests succeed.
    struct StallingRewriter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScriptRewriter for StallingRewriter {
        async fn rewrite(&self, _request: &RewriteRequest) -> Result<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok("shorter script".to_string())
        }
    }

    #[tokio::test]
    async fn test_cancelled_rewrite_releases_the_slot() {
        let config = Config {
            pipeline: PipelineConfig::instant(),
            ..Config::default()
        };
        let rewriter = StallingRewriter { calls: AtomicUsize::new(0) };
        let flow =
            Workflow::with_components(config, Box::new(FixedProbe(Some(10.0))), Box::new(rewriter));

        let mut session = flow.new_session();
        session.set_script("x".repeat(100)).unwrap();
        flow.load_media(&mut session, "clip.mp4").await.unwrap();
        session.proceed().unwrap();
        assert_eq!(session.confirm_configuration().unwrap(), Step::Optimize);

        let stalled =
            tokio::time::timeout(Duration::from_millis(20), flow.optimize_script(&session)).await;
        assert!(stalled.is_err());

        assert_eq!(flow.optimize_script(&session).await.unwrap(), "shorter script");
    }

    #[test]
    fn test_in_flight_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn test_mismatch_without_options_stops_on_optimize() {
        let flow = workflow(Some(10.0), ScriptedRewriter::new(None));
        let result = flow.run(&plan(&"x".repeat(100)), &NoopObserver).await;
        assert!(matches!(result, Err(DubError::DurationMismatch(_))));
    }

    #[tokio::test]
    async fn test_failed_rewrite_with_ignore_falls_back() {
        let flow = workflow(Some(10.0), ScriptedRewriter::new(None));
        let mut dub = plan(&"x".repeat(100));
        dub.optimize = true;
        dub.ignore_warning = true;

        let (session, summary) = flow.run(&dub, &NoopObserver).await.unwrap();
        assert_eq!(session.step(), Step::Result);
        assert_eq!(summary.status, DurationStatus::TooLong);
        assert_eq!(session.script(), "x".repeat(100));
    }

    #[tokio::test]
    async fn test_settings_from_plan_are_applied() {
        let flow = workflow(Some(10.0), ScriptedRewriter::new(None));
        let mut dub = plan(&"x".repeat(100));
        dub.voice_updates =
            vec![VoiceUpdate::Speed(2.0), VoiceUpdate::Voice(VoiceId::PresenterMale)];
        dub.subtitle_updates = vec![SubtitleUpdate::Preset(SubtitlePreset::Outline)];

        let (session, summary) = flow.run(&dub, &NoopObserver).await.unwrap();
        assert_eq!(summary.voice, VoiceId::PresenterMale);
        assert_eq!(summary.subtitles, Some(SubtitlePreset::Outline));
        assert_eq!(session.analysis().status, DurationStatus::Ok);
    }

    #[tokio::test]
    async fn test_process_rejected_outside_process_step() {
        let flow = workflow(Some(10.0), ScriptedRewriter::new(None));
        let mut session = flow.new_session();
        let result = flow.process(&mut session, &NoopObserver).await;
        assert!(matches!(result, Err(DubError::InvalidTransition { from: Step::Upload, .. })));
    }
}
