//! Vision-language model provider
//!
//! The page is persisted to a uniquely named temporary file, referenced from a
//! single-turn chat request together with a fixed transcription instruction,
//! and sent to an OpenAI-compatible server (vLLM, TGI, llama.cpp ...) that
//! hosts the base model and, optionally, a fine-tuned adapter on top of it.
//! The server renders the model's chat template and returns only the newly
//! generated span, never the echoed prompt.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::provider::OcrEngine;
use super::types::{DecodedImage, OcrError, OcrProvider};
use crate::config::{ImageTransport, VisionConfig};

/// Instruction sent with every page
pub const TRANSCRIBE_INSTRUCTION: &str = "Transcribe all of the text on this document page \
exactly as it appears, preserving the reading order and line breaks. Do not translate, \
summarize or correct anything, and do not invent text that is not on the page. \
Return only the transcription.";

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// Single user turn: the page first, then the instruction
    pub fn transcription(model: &str, image_url: String, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                    ContentPart::Text {
                        text: TRANSCRIBE_INSTRUCTION.to_string(),
                    },
                ],
            }],
            max_tokens,
            temperature: 0.0,
        }
    }

    /// URL of the first image part, if any
    pub fn image_url(&self) -> Option<&str> {
        self.messages
            .iter()
            .flat_map(|m| m.content.iter())
            .find_map(|part| match part {
                ContentPart::ImageUrl { image_url } => Some(image_url.url.as_str()),
                ContentPart::Text { .. } => None,
            })
    }
}

/// Transport to a chat-completion capable model server
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run the request and return the generated text only
    async fn complete(&self, request: &ChatRequest) -> Result<String, OcrError>;

    async fn is_available(&self) -> bool;
}

/// OpenAI-compatible `/chat/completions` client
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatBackend for OpenAiCompatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, OcrError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .authorized(self.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call model server: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Model server returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| OcrError::ApiError("Model server returned no choices".to_string()))
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self.authorized(self.client.get(&url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Vision-language model OCR provider
pub struct VisionProvider {
    backend: Arc<dyn ChatBackend>,
    model: String,
    max_tokens: u32,
    transport: ImageTransport,
    /// Where page files are written; the system temp dir when unset
    scratch_dir: Option<PathBuf>,
}

impl VisionProvider {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        model: impl Into<String>,
        max_tokens: u32,
        transport: ImageTransport,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            max_tokens,
            transport,
            scratch_dir: None,
        }
    }

    /// Build from configuration; `None` when no model is configured
    pub fn from_config(config: &VisionConfig, client: reqwest::Client) -> Option<Self> {
        let model = config.served_model()?;
        let backend = OpenAiCompatClient::new(client, &config.api_url, config.api_key.clone());
        Some(Self::new(
            Arc::new(backend),
            model,
            config.max_tokens,
            config.image_transport,
        ))
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    async fn persist_page(&self, png: Vec<u8>) -> Result<NamedTempFile, OcrError> {
        let dir = self.scratch_dir.clone();
        tokio::task::spawn_blocking(move || -> Result<NamedTempFile, OcrError> {
            use std::io::Write;

            let mut builder = tempfile::Builder::new();
            builder.prefix("ocr_page_").suffix(".png");
            let mut file = match dir {
                Some(dir) => builder.tempfile_in(dir),
                None => builder.tempfile(),
            }
            .map_err(|e| OcrError::TempFile(format!("Failed to create page file: {}", e)))?;

            file.write_all(&png)
                .and_then(|_| file.flush())
                .map_err(|e| OcrError::TempFile(format!("Failed to write page file: {}", e)))?;
            Ok(file)
        })
        .await
        .map_err(|e| OcrError::TempFile(format!("Page writer task failed: {}", e)))?
    }

    async fn image_reference(&self, page: &NamedTempFile) -> Result<String, OcrError> {
        match self.transport {
            ImageTransport::File => Ok(format!("file://{}", page.path().display())),
            ImageTransport::Inline => {
                let bytes = tokio::fs::read(page.path())
                    .await
                    .map_err(|e| OcrError::TempFile(format!("Failed to read page file: {}", e)))?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                Ok(format!("data:image/png;base64,{}", encoded))
            }
        }
    }
}

#[async_trait]
impl OcrEngine for VisionProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Vision
    }

    async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    async fn recognize(&self, image: &DecodedImage, _language: &str) -> Result<String, OcrError> {
        // Removed when `page` drops, on success and on every early return
        let page = self.persist_page(image.png.clone()).await?;

        let reference = self.image_reference(&page).await?;
        let request = ChatRequest::transcription(&self.model, reference, self.max_tokens);

        tracing::debug!(
            model = %self.model,
            max_tokens = self.max_tokens,
            page = %page.path().display(),
            "Sending page to vision model"
        );

        let text = self.backend.complete(&request).await?;

        page.close()
            .map_err(|e| OcrError::TempFile(format!("Failed to remove page file: {}", e)))?;

        Ok(text.trim().to_string())
    }
}
