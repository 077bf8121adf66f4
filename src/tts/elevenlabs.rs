//! ElevenLabs text-to-speech provider

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use super::audio::{collect_chunks, write_temp_audio};
use super::provider::SpeechSynthesizer;
use super::types::{SpeechRequest, SynthesizedAudio, TtsError, TtsProvider};
use super::voices::VoiceTable;
use crate::config::{ConfigError, ElevenLabsConfig};

pub struct ElevenLabsProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model_id: String,
    output_format: String,
    voices: VoiceTable,
    scratch_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsProvider {
    /// Fails fast when no usable API key is configured
    pub fn new(
        config: &ElevenLabsConfig,
        voices: VoiceTable,
        client: reqwest::Client,
    ) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing("ELEVENLABS_API_KEY"))?
            .to_string();

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            output_format: config.output_format.clone(),
            voices,
            scratch_dir: None,
        })
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn voices(&self) -> &VoiceTable {
        &self.voices
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsProvider {
    fn provider_type(&self) -> TtsProvider {
        TtsProvider::ElevenLabs
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        match self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, TtsError> {
        // Resolved before any network traffic
        let voice_id = self.voices.resolve(&request.voice)?;

        let url = format!("{}/v1/text-to-speech/{}/stream", self.base_url, voice_id);

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", self.output_format.as_str())])
            .header("xi-api-key", &self.api_key)
            .json(&SynthesizeRequest {
                text: &request.text,
                model_id: &self.model_id,
            })
            .send()
            .await
            .map_err(|e| TtsError::Api(format!("Failed to send request to ElevenLabs: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Api(format!("ElevenLabs API error {}: {}", status, body)));
        }

        let audio = collect_chunks(response.bytes_stream()).await?;

        tracing::info!(
            voice = %request.voice,
            voice_id = %voice_id,
            bytes = audio.len(),
            "Speech synthesized"
        );

        write_temp_audio(audio, self.scratch_dir.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_support::serve;
    use axum::{
        body::Body,
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use futures::stream;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// What the fake API saw for one synthesis call
    #[derive(Debug, Clone)]
    struct Received {
        voice_id: String,
        output_format: Option<String>,
        api_key: Option<String>,
        body: serde_json::Value,
    }

    fn recording_api(seen: Arc<Mutex<Vec<Received>>>, chunks: Vec<Vec<u8>>) -> Router {
        Router::new().route(
            "/v1/text-to-speech/:voice_id/stream",
            post(
                move |Path(voice_id): Path<String>,
                      Query(query): Query<HashMap<String, String>>,
                      headers: HeaderMap,
                      Json(body): Json<serde_json::Value>| async move {
                    seen.lock().unwrap().push(Received {
                        voice_id,
                        output_format: query.get("output_format").cloned(),
                        api_key: headers
                            .get("xi-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(String::from),
                        body,
                    });
                    Body::from_stream(stream::iter(
                        chunks.into_iter().map(Ok::<_, std::io::Error>),
                    ))
                },
            ),
        )
    }

    fn arabic_request(voice: &str) -> SpeechRequest {
        SpeechRequest {
            text: "مرحبا بكم".to_string(),
            voice: voice.to_string(),
            language: "ar".to_string(),
        }
    }

    fn config_with_key(key: Option<&str>) -> ElevenLabsConfig {
        let mut config = Config::default().tts.elevenlabs;
        config.api_key = key.map(String::from);
        // Unroutable, so any request that does go out fails loudly as an Api error
        config.base_url = "http://127.0.0.1:9".to_string();
        config
    }

    #[test]
    fn test_missing_or_blank_key_fails_at_construction() {
        for key in [None, Some(""), Some("   ")] {
            let result = ElevenLabsProvider::new(
                &config_with_key(key),
                VoiceTable::builtin(),
                reqwest::Client::new(),
            );
            assert!(matches!(result, Err(ConfigError::Missing("ELEVENLABS_API_KEY"))));
        }
    }

    #[tokio::test]
    async fn test_unknown_voice_fails_before_network() {
        let provider = ElevenLabsProvider::new(
            &config_with_key(Some("sk-test")),
            VoiceTable::builtin(),
            reqwest::Client::new(),
        )
        .unwrap();

        let request = SpeechRequest {
            text: "مرحبا".to_string(),
            voice: "NotAVoice".to_string(),
            language: "ar".to_string(),
        };
        match provider.synthesize(&request).await {
            Err(TtsError::UnknownVoice { requested, supported }) => {
                assert_eq!(requested, "NotAVoice");
                assert_eq!(supported.len(), 10);
            }
            other => panic!("expected UnknownVoice, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_streamed_audio_is_written_whole() {
        let chunks = vec![vec![0xFF; 5000], vec![0xFB, 0x90, 0x64], vec![7; 70000]];
        let expected = chunks.concat();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base_url = serve(recording_api(seen.clone(), chunks)).await;

        let mut config = config_with_key(Some("sk-test"));
        config.base_url = format!("{}/", base_url);
        let scratch = TempDir::new().unwrap();
        let provider = ElevenLabsProvider::new(&config, VoiceTable::builtin(), reqwest::Client::new())
            .unwrap()
            .with_scratch_dir(scratch.path());

        let audio = provider.synthesize(&arabic_request("Aisha")).await.unwrap();
        assert_eq!(audio.size(), 75003);
        assert_eq!(std::fs::metadata(audio.path()).unwrap().len(), 75003);
        assert_eq!(audio.into_bytes().await.unwrap(), expected);

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        let received = &seen[0];
        assert_eq!(received.voice_id, "XB0fDUnXU5powFXDhCwa");
        assert_eq!(received.output_format.as_deref(), Some(config.output_format.as_str()));
        assert_eq!(received.api_key.as_deref(), Some("sk-test"));
        assert_eq!(received.body["model_id"], config.model_id.as_str());
        assert_eq!(received.body["text"], "مرحبا بكم");
    }

    #[tokio::test]
    async fn test_error_status_is_an_api_error() {
        let app = Router::new().route(
            "/v1/text-to-speech/:voice_id/stream",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let mut config = config_with_key(Some("sk-wrong"));
        config.base_url = serve(app).await;
        let scratch = TempDir::new().unwrap();
        let provider = ElevenLabsProvider::new(&config, VoiceTable::builtin(), reqwest::Client::new())
            .unwrap()
            .with_scratch_dir(scratch.path());

        match provider.synthesize(&arabic_request("Brian")).await {
            Err(TtsError::Api(message)) => {
                assert!(message.contains("401"), "{}", message);
                assert!(message.contains("invalid api key"), "{}", message);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_an_api_error() {
        let provider = ElevenLabsProvider::new(
            &config_with_key(Some("sk-test")),
            VoiceTable::builtin(),
            reqwest::Client::new(),
        )
        .unwrap();

        let request = SpeechRequest {
            text: "مرحبا".to_string(),
            voice: "Aisha".to_string(),
            language: "ar".to_string(),
        };
        assert!(matches!(
            provider.synthesize(&request).await,
            Err(TtsError::Api(_))
        ));
    }
}
