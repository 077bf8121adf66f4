//! OCR Service
//!
//! Wraps the configured engine: decodes the upload, picks the language and
//! hands the page to the backend.

use std::sync::Arc;
use std::time::Instant;

use super::{
    page::decode_image,
    provider::{OcrEngine, TesseractProvider},
    types::{ExtractionResult, OcrError, OcrProvider},
    vision::VisionProvider,
};
use crate::config::{OcrBackend, OcrConfig};

/// OCR service shared by all requests
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    default_language: String,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>, default_language: impl Into<String>) -> Self {
        Self {
            engine,
            default_language: default_language.into(),
        }
    }

    /// Create the service for the configured backend
    pub fn from_config(config: &OcrConfig, client: reqwest::Client) -> Result<Self, OcrError> {
        let engine: Arc<dyn OcrEngine> = match config.backend {
            OcrBackend::Tesseract => Arc::new(TesseractProvider::new(config.tesseract_cmd.clone())),
            OcrBackend::Vision => {
                let provider = VisionProvider::from_config(&config.vision, client).ok_or_else(|| {
                    OcrError::EngineUnavailable("no vision model configured".to_string())
                })?;
                Arc::new(provider)
            }
        };

        Ok(Self::new(engine, config.default_lang.clone()))
    }

    pub fn provider(&self) -> OcrProvider {
        self.engine.provider_type()
    }

    pub async fn is_available(&self) -> bool {
        self.engine.is_available().await
    }

    /// Decode `image_bytes` and extract its text
    pub async fn extract_text(
        &self,
        image_bytes: Vec<u8>,
        language: Option<&str>,
    ) -> Result<ExtractionResult, OcrError> {
        let lang = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_language.as_str());

        let page = decode_image(image_bytes).await?;

        let started = Instant::now();
        let text = self.engine.recognize(&page, lang).await?;

        tracing::info!(
            provider = ?self.engine.provider_type(),
            lang = %lang,
            width = page.width,
            height = page.height,
            chars = text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "OCR complete"
        );

        Ok(ExtractionResult {
            extracted_text: text,
        })
    }
}
