//! OCR / voice server library
//!
//! Exposes the building blocks of the server so the binary in `main.rs` and
//! the integration tests share them.
//!
//! # Modules
//!
//! - `ocr`: page image to text (tesseract or a vision-language model)
//! - `language`: short text generation
//! - `tts`: text to MP3 (free translate TTS or ElevenLabs)
//! - `routes`: the HTTP surface

pub mod config;
pub mod error;
pub mod language;
pub mod ocr;
pub mod routes;
pub mod state;
pub mod tts;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use state::AppState;
