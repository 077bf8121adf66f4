//! OCR Types

use serde::Serialize;

/// OCR backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Tesseract OCR (local executable)
    Tesseract,
    /// Vision-language model
    Vision,
}

/// An uploaded page after decoding
///
/// The pixels are kept re-encoded as PNG so every backend receives the same
/// lossless format regardless of what the client uploaded.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Body of a successful `/ocr` response
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub extracted_text: String,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("No image provided. Use field name 'file'")]
    MissingImage,

    #[error("Cannot decode image: {0}")]
    InvalidImage(String),

    #[error("Unsupported OCR language: {0}")]
    UnsupportedLanguage(String),

    #[error("OCR engine not available: {0}")]
    EngineUnavailable(String),

    #[error("Failed to handle temporary page file: {0}")]
    TempFile(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("API error: {0}")]
    ApiError(String),
}

impl OcrError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingImage | Self::InvalidImage(_) | Self::UnsupportedLanguage(_)
        )
    }
}
