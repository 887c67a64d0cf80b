use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, DubError};

/// Abstract media tool command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media tool command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a positional input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Suppress tool banners and log output
    pub fn quiet(self) -> Self {
        self.arg("-v").arg("quiet")
    }

    /// Request JSON output
    pub fn json_output(self) -> Self {
        self.arg("-print_format").arg("json")
    }

    /// Include container-level information
    pub fn show_format(self) -> Self {
        self.arg("-show_format")
    }

    /// Execute the command and return its standard output.
    ///
    /// A binary that cannot be started is a `Media` error; one that runs and
    /// exits unsuccessfully is `CommandFailed`.
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                DubError::Media(format!("Failed to execute {}: {}", self.binary_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubError::CommandFailed {
                command: self.description.clone(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Builder for the probe commands the crate needs
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build a container-duration probe
    pub fn probe_duration<P: AsRef<Path>>(&self, media_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Duration probe")
            .quiet()
            .json_output()
            .show_format()
            .input(media_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_duration_args() {
        let command = MediaCommandBuilder::new("ffprobe").probe_duration("clip.mp4");
        assert_eq!(command.binary_path, "ffprobe");
        assert_eq!(
            command.args,
            vec!["-v", "quiet", "-print_format", "json", "-show_format", "clip.mp4"]
        );
    }

    #[test]
    fn test_version_check_args() {
        let command = MediaCommandBuilder::new("/opt/ffprobe").version_check();
        assert_eq!(command.args, vec!["-version"]);
        assert_eq!(command.description, "Version check");
    }

    #[tokio::test]
    async fn test_missing_binary_is_media_error() {
        let command = MediaCommand::new("smartdub-no-such-binary", "Missing");
        let result = command.execute().await;
        assert!(matches!(result, Err(DubError::Media(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_exit_is_command_failed() {
        let command = MediaCommand::new("false", "Always fails");
        let result = command.execute().await;
        assert!(matches!(
            result,
            Err(DubError::CommandFailed { ref command, .. }) if command == "Always fails"
        ));
    }
}
