//! Application state management
//!
//! Every backend handle is created once here and shared read-only by all
//! requests through axum's `State` extractor.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ConfigError};
use crate::error::ErrorPolicy;
use crate::language::LanguageService;
use crate::ocr::{OcrError, OcrService};
use crate::tts::TtsService;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize OCR backend: {0}")]
    Ocr(#[from] OcrError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    ocr: OcrService,
    tts: TtsService,
    language: Option<LanguageService>,
    errors: ErrorPolicy,
}

impl AppState {
    pub fn new(
        ocr: OcrService,
        tts: TtsService,
        language: Option<LanguageService>,
        errors: ErrorPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                ocr,
                tts,
                language,
                errors,
            }),
        }
    }

    /// Build every backend from configuration
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let ocr = OcrService::from_config(&config.ocr, client.clone())?;
        let tts = TtsService::from_config(&config.tts, client.clone())?;
        let language = LanguageService::from_config(&config.language, client);

        tracing::info!("OCR backend: {:?}", ocr.provider());
        tracing::info!("TTS backend: {:?}", tts.provider());
        match &language {
            Some(service) => tracing::info!("Language model: {}", service.model()),
            None => tracing::info!("Language model disabled, /respond not mounted"),
        }

        Ok(Self::new(
            ocr,
            tts,
            language,
            ErrorPolicy {
                strict_status_codes: config.http.strict_status_codes,
            },
        ))
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }

    /// Get the TTS service
    pub fn tts(&self) -> &TtsService {
        &self.inner.tts
    }

    /// Get the language service, if one is configured
    pub fn language(&self) -> Option<&LanguageService> {
        self.inner.language.as_ref()
    }

    /// Get the error rendering policy
    pub fn errors(&self) -> ErrorPolicy {
        self.inner.errors
    }
}
