//! OCR Providers
//!
//! Defines the engine trait and the tesseract implementation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::types::{DecodedImage, OcrError, OcrProvider};

/// Capability shared by every OCR backend: decoded page in, text out
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> OcrProvider;

    /// Check if the backend can currently be reached
    async fn is_available(&self) -> bool;

    /// Perform OCR on a decoded page
    async fn recognize(&self, image: &DecodedImage, language: &str) -> Result<String, OcrError>;
}

/// Tesseract OCR provider
///
/// Drives the `tesseract` executable at a configured path, piping the page in
/// on stdin and reading the text from stdout, so nothing touches the disk.
pub struct TesseractProvider {
    command: PathBuf,
}

impl TesseractProvider {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }
}

/// Tesseract language specs look like `ara`, `eng+ara` or `script/Arabic`
fn validate_language(language: &str) -> Result<(), OcrError> {
    let valid = !language.is_empty()
        && language.len() <= 64
        && !language.starts_with('-')
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '/'));

    if valid {
        Ok(())
    } else {
        Err(OcrError::UnsupportedLanguage(language.to_string()))
    }
}

#[async_trait]
impl OcrEngine for TesseractProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn recognize(&self, image: &DecodedImage, language: &str) -> Result<String, OcrError> {
        validate_language(language)?;

        let mut child = Command::new(&self.command)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => OcrError::EngineUnavailable(format!(
                    "{} is not installed or it's not in your PATH",
                    self.command.display()
                )),
                _ => OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::ProcessingError("tesseract stdin unavailable".to_string()))?;

        // Feed stdin while collecting stdout so neither pipe can fill up and stall
        let feed = async move {
            let result = stdin.write_all(&image.png).await;
            drop(stdin);
            result
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("Failed loading language") || stderr.contains("Error opening data file") {
                return Err(OcrError::UnsupportedLanguage(language.to_string()));
            }
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        if let Err(e) = fed {
            // tesseract exited successfully anyway; a broken pipe after it read the image is harmless
            tracing::debug!("tesseract closed stdin early: {}", e);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
