//! TTS Module
//!
//! Speech synthesis for `/tts`. Two mutually exclusive backends, chosen by
//! `TTS_BACKEND`:
//! - Google translate TTS (free, selected by language code)
//! - ElevenLabs (commercial, selected by voice name through [`VoiceTable`])
//!
//! Both produce an MP3 written to a uniquely named temporary file.

mod audio;
mod elevenlabs;
mod google;
mod provider;
mod service;
mod types;
mod voices;

pub use audio::{collect_chunks, write_temp_audio};
pub use elevenlabs::ElevenLabsProvider;
pub use google::{split_text, GoogleTtsProvider, MAX_CHUNK_CHARS, SUPPORTED_LANGUAGES};
pub use provider::SpeechSynthesizer;
pub use service::TtsService;
pub use types::{SpeechRequest, SynthesizedAudio, TtsError, TtsProvider};
pub use voices::VoiceTable;
