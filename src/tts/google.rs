//! Google translate TTS provider
//!
//! The free endpoint only accepts short inputs, so text is split into pieces
//! of at most [`MAX_CHUNK_CHARS`] characters and the MP3 segments returned
//! for each piece are concatenated in order.

use std::path::PathBuf;

use async_trait::async_trait;

use super::audio::{collect_chunks, write_temp_audio};
use super::provider::SpeechSynthesizer;
use super::types::{SpeechRequest, SynthesizedAudio, TtsError, TtsProvider};

pub const MAX_CHUNK_CHARS: usize = 100;

const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Language codes the endpoint speaks
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "af", "am", "ar", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de", "el", "en", "es", "et",
    "eu", "fi", "fr", "fr-CA", "gl", "gu", "ha", "hi", "hr", "hu", "id", "is", "it", "iw", "ja",
    "jw", "km", "kn", "ko", "la", "lt", "lv", "ml", "mr", "ms", "my", "ne", "nl", "no", "pa",
    "pl", "pt", "pt-PT", "ro", "ru", "si", "sk", "sq", "sr", "su", "sv", "sw", "ta", "te", "th",
    "tl", "tr", "uk", "ur", "vi", "yue", "zh", "zh-CN", "zh-TW",
];

pub struct GoogleTtsProvider {
    client: reqwest::Client,
    endpoint: String,
    scratch_dir: Option<PathBuf>,
}

impl GoogleTtsProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            scratch_dir: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    fn resolve_language(language: &str) -> Result<&'static str, TtsError> {
        let language = language.trim();
        SUPPORTED_LANGUAGES
            .iter()
            .find(|code| code.eq_ignore_ascii_case(language))
            .copied()
            .ok_or_else(|| TtsError::UnsupportedLanguage(language.to_string()))
    }

    async fn fetch_segment(
        &self,
        text: &str,
        language: &str,
        index: usize,
        total: usize,
    ) -> Result<Vec<u8>, TtsError> {
        let index_param = index.to_string();
        let total_param = total.to_string();
        let length_param = text.chars().count().to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", text),
                ("idx", index_param.as_str()),
                ("total", total_param.as_str()),
                ("textlen", length_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TtsError::Api(format!("Failed to call translate TTS: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(TtsError::Api(format!(
                "Translate TTS returned {} for segment {}/{}",
                status,
                index + 1,
                total
            )));
        }

        collect_chunks(response.bytes_stream()).await
    }
}

/// Split `text` into pieces of at most `max_chars` characters, breaking on
/// whitespace where possible and hard-splitting words that are too long.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for slice in chars.chunks(max_chars) {
                pieces.push(slice.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsProvider {
    fn provider_type(&self) -> TtsProvider {
        TtsProvider::Google
    }

    async fn is_available(&self) -> bool {
        match self.client.head(&self.endpoint).send().await {
            Ok(response) => !response.status().is_server_error(),
            Err(_) => false,
        }
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, TtsError> {
        let language = Self::resolve_language(&request.language)?;

        let pieces = split_text(&request.text, MAX_CHUNK_CHARS);
        if pieces.is_empty() {
            return Err(TtsError::EmptyText);
        }

        let total = pieces.len();
        let mut audio = Vec::new();
        for (index, piece) in pieces.iter().enumerate() {
            let segment = self.fetch_segment(piece, language, index, total).await?;
            audio.extend_from_slice(&segment);
        }

        tracing::info!(
            lang = %language,
            segments = total,
            bytes = audio.len(),
            "Speech synthesized"
        );

        write_temp_audio(audio, self.scratch_dir.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::{extract::Query, http::StatusCode, routing::get, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Answers each segment with a marker naming its position
    fn marking_endpoint(seen: Arc<Mutex<Vec<HashMap<String, String>>>>) -> Router {
        Router::new().route(
            "/translate_tts",
            get(move |Query(query): Query<HashMap<String, String>>| async move {
                let marker = format!(
                    "[{}:{}:{}]",
                    query.get("idx").cloned().unwrap_or_default(),
                    query.get("total").cloned().unwrap_or_default(),
                    query.get("tl").cloned().unwrap_or_default(),
                );
                seen.lock().unwrap().push(query);
                marker
            }),
        )
    }

    #[test]
    fn test_short_text_is_one_piece() {
        assert_eq!(split_text("مرحبا بكم", 100), vec!["مرحبا بكم".to_string()]);
        assert!(split_text("   ", 100).is_empty());
    }

    #[test]
    fn test_pieces_respect_limit_and_keep_words() {
        let text = "كان يا ما كان في قديم الزمان ".repeat(20);
        let pieces = split_text(&text, 100);
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.chars().count() <= 100);
        }
        let rejoined = pieces.join(" ");
        assert_eq!(
            rejoined.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_overlong_word_is_hard_split() {
        let word = "ا".repeat(250);
        let pieces = split_text(&format!("قبل {} بعد", word), 100);
        assert_eq!(pieces.first().map(String::as_str), Some("قبل"));
        assert_eq!(pieces.last().map(String::as_str), Some("بعد"));
        assert_eq!(pieces.len(), 5);
        assert_eq!(pieces[1].chars().count(), 100);
        assert_eq!(pieces[3].chars().count(), 50);
    }

    #[test]
    fn test_language_resolution() {
        assert_eq!(GoogleTtsProvider::resolve_language("ar").unwrap(), "ar");
        assert_eq!(GoogleTtsProvider::resolve_language("zh-cn").unwrap(), "zh-CN");
        assert!(matches!(
            GoogleTtsProvider::resolve_language("xx"),
            Err(TtsError::UnsupportedLanguage(_))
        ));
    }

    #[tokio::test]
    async fn test_unsupported_language_fails_before_network() {
        // Unroutable endpoint: reaching the network would surface as an Api error instead
        let provider = GoogleTtsProvider::new(reqwest::Client::new()).with_endpoint("http://127.0.0.1:9/tts");
        let request = SpeechRequest {
            text: "hello".to_string(),
            voice: String::new(),
            language: "klingon".to_string(),
        };
        let result = provider.synthesize(&request).await;
        assert!(matches!(result, Err(TtsError::UnsupportedLanguage(_))));
    }

    #[tokio::test]
    async fn test_segments_are_fetched_and_joined_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base_url = serve(marking_endpoint(seen.clone())).await;
        let scratch = TempDir::new().unwrap();
        let provider = GoogleTtsProvider::new(reqwest::Client::new())
            .with_endpoint(format!("{}/translate_tts", base_url))
            .with_scratch_dir(scratch.path());

        // 60 four-letter words: three pieces of twenty words each
        let text = "كلمة ".repeat(60);
        let request = SpeechRequest {
            text: text.clone(),
            voice: String::new(),
            language: "AR".to_string(),
        };
        let audio = provider.synthesize(&request).await.unwrap();
        let bytes = audio.into_bytes().await.unwrap();
        assert_eq!(bytes, b"[0:3:ar][1:3:ar][2:3:ar]".to_vec());

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        let mut words = Vec::new();
        for query in &seen {
            let piece = &query["q"];
            assert!(piece.chars().count() <= MAX_CHUNK_CHARS);
            assert_eq!(query["textlen"], piece.chars().count().to_string());
            assert_eq!(query["client"], "tw-ob");
            words.extend(piece.split_whitespace().map(String::from));
        }
        assert_eq!(words, text.split_whitespace().map(String::from).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_rejected_segment_is_an_api_error() {
        let app = Router::new().route(
            "/translate_tts",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base_url = serve(app).await;
        let scratch = TempDir::new().unwrap();
        let provider = GoogleTtsProvider::new(reqwest::Client::new())
            .with_endpoint(format!("{}/translate_tts", base_url))
            .with_scratch_dir(scratch.path());

        let request = SpeechRequest {
            text: "مرحبا".to_string(),
            voice: String::new(),
            language: "ar".to_string(),
        };
        match provider.synthesize(&request).await {
            Err(TtsError::Api(message)) => assert!(message.contains("429"), "{}", message),
            other => panic!("expected Api error, got {:?}", other),
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
