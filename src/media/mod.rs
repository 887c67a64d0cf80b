// Media access for the wizard
//
// Only the duration of a selected file is ever read:
// - Probe: async trait with an ffprobe-based implementation
// - Commands: command builders for the probe tool
// - Handle: ownership of the selected file for a session's lifetime

pub mod commands;
pub mod handle;
pub mod probe;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use handle::*;
pub use probe::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for reading media metadata
#[async_trait]
pub trait MediaProbeTrait: Send + Sync {
    /// Read the duration of a media file in seconds
    async fn probe_duration(&self, media_path: &Path) -> Result<f64>;

    /// Check if the probe tool is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media probe instances
pub struct MediaProbeFactory;

impl MediaProbeFactory {
    /// Create the default probe implementation (ffprobe-based)
    pub fn create_probe(config: MediaConfig) -> Box<dyn MediaProbeTrait> {
        Box::new(probe::FfprobeProbe::new(config))
    }
}
