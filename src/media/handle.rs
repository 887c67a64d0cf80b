use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// A selected media file owned by a wizard session.
///
/// Acquired once the file has been probed, released on drop (reset or
/// replacement by a newer selection). Not `Clone`: one release per handle.
#[derive(Debug)]
pub struct MediaHandle {
    id: Uuid,
    path: PathBuf,
    duration: f64,
}

impl MediaHandle {
    pub fn acquire<P: Into<PathBuf>>(path: P, duration: f64) -> Self {
        let handle = Self {
            id: Uuid::new_v4(),
            path: path.into(),
            duration,
        };
        debug!("Acquired media handle {} for {}", handle.id, handle.path.display());
        handle
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Measured duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        debug!("Released media handle {} for {}", self.id, self.path.display());
    }
}
