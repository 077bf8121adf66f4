//! OCR Module
//!
//! Turns an uploaded document image into plain text.
//!
//! Supports two mutually exclusive backends, chosen by `OCR_BACKEND`:
//! - Tesseract (local executable, selected language code)
//! - Vision-language model served behind an OpenAI-compatible API,
//!   optionally with a fine-tuned adapter on top of the base model
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_voice_server::ocr::OcrService;
//!
//! let service = OcrService::from_config(&config.ocr, http_client);
//! let result = service.extract_text(upload_bytes, Some("ara")).await?;
//! println!("{}", result.extracted_text);
//! ```

mod page;
mod provider;
mod service;
mod types;
mod vision;

pub use page::{decode_image, decode_image_blocking};
pub use provider::{OcrEngine, TesseractProvider};
pub use service::OcrService;
pub use types::{DecodedImage, ExtractionResult, OcrError, OcrProvider};
pub use vision::{
    ChatBackend, ChatMessage, ChatRequest, ContentPart, ImageUrl, OpenAiCompatClient,
    VisionProvider, TRANSCRIBE_INSTRUCTION,
};
