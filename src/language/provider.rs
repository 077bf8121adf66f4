//! Text generation backends

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::LanguageError;

/// Autoregressive text generation over a pre-loaded model
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Name of the model doing the generation
    fn model(&self) -> &str;

    async fn is_available(&self) -> bool;

    /// Continue `prompt`; returns the generated continuation only
    async fn complete(&self, prompt: &str) -> Result<String, LanguageError>;
}

/// Ollama `/api/generate` backend
///
/// Runs in raw mode so the prompt is continued as plain text without the
/// model's chat template.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_length: u32,
}

impl OllamaGenerator {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str, max_length: u32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_length,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, LanguageError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            raw: true,
            stream: false,
            options: GenerateOptions {
                num_predict: self.max_length,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LanguageError::ApiError(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LanguageError::ApiError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LanguageError::GenerationFailed(format!("Failed to parse response: {}", e)))?;

        Ok(result.response)
    }
}
