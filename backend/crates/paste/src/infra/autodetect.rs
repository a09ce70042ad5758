//! External-program language detection

use std::io::Write;
use std::time::Duration;

use tokio::process::Command;

use crate::domain::repository::LanguageDetector;

const DETECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs `<command> <file>` on a scratch copy of the content and reads the
/// language name from stdout
#[derive(Debug, Clone)]
pub struct CommandDetector {
    command: String,
}

impl CommandDetector {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    async fn run(&self, content: &str) -> std::io::Result<Option<String>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let output = tokio::time::timeout(
            DETECT_TIMEOUT,
            Command::new(&self.command)
                .arg(file.path())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "detector timed out"))??;

        if !output.status.success() {
            tracing::warn!(status = %output.status, "Language detector exited with failure");
            return Ok(None);
        }

        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!name.is_empty()).then_some(name))
    }
}

impl LanguageDetector for CommandDetector {
    async fn detect(&self, content: &str) -> Option<String> {
        match self.run(content).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(error = %e, command = %self.command, "Language detection failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_detect_reads_stdout() {
        // `cat` echoes the scratch file back
        let detector = CommandDetector::new("cat");
        assert_eq!(detector.detect("Rust\n").await.as_deref(), Some("Rust"));
    }

    #[tokio::test]
    async fn test_detect_empty_output() {
        let detector = CommandDetector::new("cat");
        assert_eq!(detector.detect("   \n").await, None);
    }

    #[tokio::test]
    async fn test_detect_failures() {
        assert_eq!(CommandDetector::new("false").detect("x").await, None);
        assert_eq!(
            CommandDetector::new("pastemyst-no-such-detector").detect("x").await,
            None
        );
    }
}
