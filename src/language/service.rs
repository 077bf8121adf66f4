//! Language service: timing and response assembly around a generator

use std::sync::Arc;
use std::time::Instant;

use super::provider::{OllamaGenerator, TextGenerator};
use super::types::{round_seconds, Generation, LanguageError};
use crate::config::{LanguageBackend, LanguageConfig};

pub struct LanguageService {
    generator: Arc<dyn TextGenerator>,
    /// Prepend the prompt to the response, as a decode of the full sequence would
    echo_prompt: bool,
}

impl LanguageService {
    pub fn new(generator: Arc<dyn TextGenerator>, echo_prompt: bool) -> Self {
        Self {
            generator,
            echo_prompt,
        }
    }

    /// `None` when no language backend is configured
    pub fn from_config(config: &LanguageConfig, client: reqwest::Client) -> Option<Self> {
        match config.backend {
            LanguageBackend::None => None,
            LanguageBackend::Ollama => Some(Self::new(
                Arc::new(OllamaGenerator::new(
                    client,
                    &config.url,
                    &config.model,
                    config.max_length,
                )),
                config.echo_prompt,
            )),
        }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub async fn is_available(&self) -> bool {
        self.generator.is_available().await
    }

    pub async fn generate(&self, text: &str) -> Result<Generation, LanguageError> {
        if text.trim().is_empty() {
            return Err(LanguageError::EmptyPrompt);
        }

        let started = Instant::now();
        let continuation = self.generator.complete(text).await?;
        let elapsed = started.elapsed().as_secs_f64();

        let response = if self.echo_prompt {
            format!("{}{}", text, continuation)
        } else {
            continuation
        };

        tracing::info!(
            model = %self.generator.model(),
            elapsed_secs = elapsed,
            "Generation complete"
        );

        Ok(Generation {
            response: response.trim().to_string(),
            inference_time_seconds: round_seconds(elapsed),
        })
    }
}
