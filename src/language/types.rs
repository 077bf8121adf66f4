//! Language generation types

use serde::Serialize;

/// Body of a successful `/respond` response
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub response: String,
    /// Wall-clock generation time, rounded to 4 decimal places
    pub inference_time_seconds: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    #[error("Prompt text must not be empty")]
    EmptyPrompt,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl LanguageError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyPrompt)
    }
}

/// Round seconds to 4 decimal places
pub(crate) fn round_seconds(seconds: f64) -> f64 {
    (seconds * 10_000.0).round() / 10_000.0
}
