//! Voice table for voice-based TTS backends
//!
//! Maps the names clients send (`voice=Aisha`) to backend voice identifiers.
//! Built once at startup and never mutated.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::types::TtsError;
use crate::config::ConfigError;

/// Built-in ElevenLabs voices. `Aisha` is served by the multilingual
/// Charlotte voice unless a voice file says otherwise.
const BUILTIN_VOICES: [(&str, &str); 10] = [
    ("Aisha", "XB0fDUnXU5powFXDhCwa"),
    ("Rachel", "21m00Tcm4TlvDq8ikWAM"),
    ("Sarah", "EXAVITQu4vr4xnSDxMaL"),
    ("Laura", "FGY2WhTYpPnrIDTdsKH5"),
    ("Alice", "Xb7hH8MSUJpSbSDYk0k2"),
    ("Matilda", "XrExE9yKIg1WjnnlVkGX"),
    ("Lily", "pFZP5JQG7iQjIQuC4Bku"),
    ("George", "JBFqnCBsd6RMkjVDRZzb"),
    ("Daniel", "onwK4e9ZLuTAKqWW03F9"),
    ("Brian", "nPczCjzI2devNBz1zQrb"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceTable {
    voices: Vec<(String, String)>,
}

#[derive(Deserialize)]
struct VoiceFile {
    voices: BTreeMap<String, String>,
}

impl Default for VoiceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VoiceTable {
    pub fn builtin() -> Self {
        Self {
            voices: BUILTIN_VOICES
                .iter()
                .map(|(name, id)| (name.to_string(), id.to_string()))
                .collect(),
        }
    }

    /// Parse a table of the form
    ///
    /// ```toml
    /// [voices]
    /// Aisha = "voice-id"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, String> {
        let file: VoiceFile = toml::from_str(source).map_err(|e| e.to_string())?;
        if file.voices.is_empty() {
            return Err("voice table is empty".to_string());
        }
        if let Some((name, _)) = file.voices.iter().find(|(_, id)| id.trim().is_empty()) {
            return Err(format!("voice '{}' has an empty id", name));
        }
        Ok(Self {
            voices: file.voices.into_iter().collect(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::VoiceTable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source).map_err(|reason| ConfigError::VoiceTable {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.voices.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Look up a voice id by its exact name.
    /// Unknown names fail with the full list of supported voices.
    pub fn resolve(&self, name: &str) -> Result<&str, TtsError> {
        let name = name.trim();
        self.voices
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, id)| id.as_str())
            .ok_or_else(|| TtsError::UnknownVoice {
                requested: name.to_string(),
                supported: self.names().into_iter().map(String::from).collect(),
            })
    }
}
