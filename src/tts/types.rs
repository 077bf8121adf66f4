//! TTS Types

use serde::Serialize;
use tempfile::TempPath;

/// TTS backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    Google,
    ElevenLabs,
}

/// A synthesis request with defaults already applied
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    /// Voice name, used by voice-based backends
    pub voice: String,
    /// Language code, used by language-based backends
    pub language: String,
}

/// MP3 audio persisted to a temporary file
///
/// The file is deleted when this value (or the path taken out of it) is dropped.
#[derive(Debug)]
pub struct SynthesizedAudio {
    path: TempPath,
    size: u64,
}

impl SynthesizedAudio {
    pub fn new(path: TempPath, size: u64) -> Self {
        Self { path, size }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read the audio back and release the temporary file
    pub async fn into_bytes(self) -> Result<Vec<u8>, TtsError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| TtsError::TempFile(format!("Failed to read audio file: {}", e)))?;
        if let Err(e) = self.path.close() {
            tracing::warn!("Failed to remove audio file: {}", e);
        }
        Ok(bytes)
    }
}

/// TTS error types
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("Text must not be empty")]
    EmptyText,

    #[error("Voice '{requested}' is not supported. Supported voices: {}", .supported.join(", "))]
    UnknownVoice {
        requested: String,
        supported: Vec<String>,
    },

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("TTS API error: {0}")]
    Api(String),

    #[error("Audio stream interrupted: {0}")]
    Stream(String),

    #[error("Failed to handle temporary audio file: {0}")]
    TempFile(String),
}

impl TtsError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyText | Self::UnknownVoice { .. } | Self::UnsupportedLanguage(_)
        )
    }
}
