//! Language Module
//!
//! Short-form text generation for `/respond`. Only mounted when a language
//! backend is configured.

mod provider;
mod service;
mod types;

pub use provider::{OllamaGenerator, TextGenerator};
pub use service::LanguageService;
pub use types::{Generation, LanguageError};
