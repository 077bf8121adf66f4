//! TTS Service
//!
//! Applies request defaults and delegates to the configured backend.

use std::sync::Arc;

use super::elevenlabs::ElevenLabsProvider;
use super::google::GoogleTtsProvider;
use super::provider::SpeechSynthesizer;
use super::types::{SpeechRequest, SynthesizedAudio, TtsError, TtsProvider};
use super::voices::VoiceTable;
use crate::config::{ConfigError, TtsBackend, TtsConfig};

pub struct TtsService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    default_language: String,
    default_voice: String,
}

impl TtsService {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        default_language: impl Into<String>,
        default_voice: impl Into<String>,
    ) -> Self {
        Self {
            synthesizer,
            default_language: default_language.into(),
            default_voice: default_voice.into(),
        }
    }

    /// Create the service for the configured backend, validating its settings eagerly
    pub fn from_config(config: &TtsConfig, client: reqwest::Client) -> Result<Self, ConfigError> {
        let synthesizer: Arc<dyn SpeechSynthesizer> = match config.backend {
            TtsBackend::Google => Arc::new(GoogleTtsProvider::new(client)),
            TtsBackend::ElevenLabs => {
                let voices = match &config.elevenlabs.voices_file {
                    Some(path) => VoiceTable::from_file(path)?,
                    None => VoiceTable::builtin(),
                };
                tracing::info!("Loaded {} voices: {}", voices.len(), voices.names().join(", "));
                Arc::new(ElevenLabsProvider::new(&config.elevenlabs, voices, client)?)
            }
        };

        Ok(Self::new(
            synthesizer,
            config.default_lang.clone(),
            config.default_voice.clone(),
        ))
    }

    pub fn provider(&self) -> TtsProvider {
        self.synthesizer.provider_type()
    }

    pub async fn is_available(&self) -> bool {
        self.synthesizer.is_available().await
    }

    pub async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        language: Option<&str>,
    ) -> Result<SynthesizedAudio, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        let request = SpeechRequest {
            text: text.to_string(),
            voice: or_default(voice, &self.default_voice),
            language: or_default(language, &self.default_language),
        };

        self.synthesizer.synthesize(&request).await
    }
}

fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}
