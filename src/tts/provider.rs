//! Speech synthesis provider trait

use async_trait::async_trait;

use super::types::{SpeechRequest, SynthesizedAudio, TtsError, TtsProvider};

/// Capability shared by every TTS backend: text plus voice/language in, MP3 file out
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn provider_type(&self) -> TtsProvider;

    async fn is_available(&self) -> bool;

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, TtsError>;
}
