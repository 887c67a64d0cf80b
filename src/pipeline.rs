//! Simulated processing sequence.
//!
//! No audio is synthesized and nothing is merged. The sequence walks a fixed
//! table of phases, advancing a 0-100 progress counter with a fixed delay per
//! increment, then holds briefly and reports completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::PipelineConfig;

pub const PROGRESS_COMPLETE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    GeneratingAudio,
    Merging,
    GeneratingSubtitles,
    Done,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::GeneratingAudio => "Synthesizing AI voice-over...",
            Phase::Merging => "Merging audio and video...",
            Phase::GeneratingSubtitles => "Generating subtitles...",
            Phase::Done => "Finishing...",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the phase table: progress runs `start..=end`, one step per delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSpec {
    pub phase: Phase,
    pub start: u8,
    pub end: u8,
    pub step_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub phase: Phase,
    pub progress: u8,
}

/// Receives progress as the sequence advances.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, update: ProgressUpdate);
}

/// Observer that ignores every update.
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _update: ProgressUpdate) {}
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub final_progress: u8,
    pub updates: usize,
    pub completed_at: DateTime<Utc>,
}

impl PipelineReport {
    pub fn is_complete(&self) -> bool {
        self.final_progress == PROGRESS_COMPLETE
    }
}

pub struct SimulatedPipeline {
    phases: Vec<PhaseSpec>,
    completion_hold: Duration,
}

impl SimulatedPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        let phases = vec![
            PhaseSpec {
                phase: Phase::GeneratingAudio,
                start: 0,
                end: 30,
                step_delay: Duration::from_millis(config.audio_step_ms),
            },
            PhaseSpec {
                phase: Phase::Merging,
                start: 30,
                end: 70,
                step_delay: Duration::from_millis(config.merge_step_ms),
            },
            PhaseSpec {
                phase: Phase::GeneratingSubtitles,
                start: 70,
                end: PROGRESS_COMPLETE,
                step_delay: Duration::from_millis(config.subtitle_step_ms),
            },
        ];

        Self {
            phases,
            completion_hold: Duration::from_millis(config.completion_hold_ms),
        }
    }

    pub fn phases(&self) -> &[PhaseSpec] {
        &self.phases
    }

    /// Run every phase in order. Always ends at 100.
    pub async fn run(&self, observer: &dyn ProgressObserver) -> PipelineReport {
        let mut progress = 0u8;
        let mut updates = 0usize;

        for stage in &self.phases {
            info!("{}", stage.phase.label());
            for value in stage.start..=stage.end {
                progress = value;
                observer.on_progress(ProgressUpdate { phase: stage.phase, progress });
                updates += 1;
                if !stage.step_delay.is_zero() {
                    tokio::time::sleep(stage.step_delay).await;
                }
            }
        }

        // A truncated table must still finish.
        if progress < PROGRESS_COMPLETE {
            progress = PROGRESS_COMPLETE;
            observer.on_progress(ProgressUpdate { phase: Phase::Done, progress });
            updates += 1;
        }

        debug!("Holding {:?} before completion", self.completion_hold);
        if !self.completion_hold.is_zero() {
            tokio::time::sleep(self.completion_hold).await;
        }

        info!("Processing finished after {} progress updates", updates);
        PipelineReport {
            final_progress: progress,
            updates,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        updates: Mutex<Vec<ProgressUpdate>>,
    }

    impl ProgressObserver for Recorder {
        fn on_progress(&self, update: ProgressUpdate) {
            self.updates.lock().unwrap().push(update);
        }
    }

    #[test]
    fn test_default_phase_table() {
        let pipeline = SimulatedPipeline::new(&PipelineConfig::default());
        let phases = pipeline.phases();
        assert_eq!(phases.len(), 3);
        assert_eq!((phases[0].start, phases[0].end), (0, 30));
        assert_eq!((phases[1].start, phases[1].end), (30, 70));
        assert_eq!((phases[2].start, phases[2].end), (70, 100));
        assert_eq!(phases[0].step_delay, Duration::from_millis(50));
        assert_eq!(phases[1].step_delay, Duration::from_millis(60));
        assert_eq!(phases[2].step_delay, Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_run_reaches_100_monotonically() {
        let pipeline = SimulatedPipeline::new(&PipelineConfig::instant());
        let recorder = Recorder::default();

        let report = pipeline.run(&recorder).await;
        assert!(report.is_complete());

        let updates = recorder.updates.lock().unwrap();
        assert_eq!(updates.len(), report.updates);
        assert_eq!(updates.first().unwrap().progress, 0);
        assert_eq!(updates.last().unwrap().progress, 100);
        assert!(updates.windows(2).all(|w| w[0].progress <= w[1].progress));
        assert_eq!(updates.iter().filter(|u| u.progress == 100).count(), 1);
    }

    #[tokio::test]
    async fn test_phases_run_in_order() {
        let pipeline = SimulatedPipeline::new(&PipelineConfig::instant());
        let recorder = Recorder::default();
        pipeline.run(&recorder).await;

        let updates = recorder.updates.lock().unwrap();
        let mut phases: Vec<Phase> = updates.iter().map(|u| u.phase).collect();
        phases.dedup();
        assert_eq!(
            phases,
            vec![Phase::GeneratingAudio, Phase::Merging, Phase::GeneratingSubtitles]
        );
        assert!(updates.iter().any(|u| u.phase == Phase::Merging && u.progress == 30));
    }

    #[tokio::test]
    async fn test_truncated_table_still_completes() {
        let mut pipeline = SimulatedPipeline::new(&PipelineConfig::instant());
        pipeline.phases.truncate(1);
        let recorder = Recorder::default();

        let report = pipeline.run(&recorder).await;
        assert_eq!(report.final_progress, 100);
        let updates = recorder.updates.lock().unwrap();
        assert_eq!(updates.last().unwrap().phase, Phase::Done);
    }

    #[tokio::test]
    async fn test_small_delays_elapse() {
        let config = PipelineConfig {
            audio_step_ms: 1,
            merge_step_ms: 0,
            subtitle_step_ms: 0,
            completion_hold_ms: 5,
        };
        let started = std::time::Instant::now();
        let report = SimulatedPipeline::new(&config).run(&NoopObserver).await;
        assert!(report.is_complete());
        assert!(started.elapsed() >= Duration::from_millis(31 + 5));
    }
}
