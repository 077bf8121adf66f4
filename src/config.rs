//! Configuration management for the OCR / voice server
//!
//! Everything is read from the process environment (after `.env` has been
//! loaded by `dotenvy`). Backend selection happens here, so a misconfigured
//! deployment fails at startup instead of on the first request.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration errors, raised before the server binds its socket
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to load voice table from {path}: {reason}")]
    VoiceTable { path: PathBuf, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub language: LanguageConfig,
    pub tts: TtsConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrBackend {
    /// Local tesseract executable
    Tesseract,
    /// Vision-language model behind an OpenAI-compatible server
    Vision,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub backend: OcrBackend,
    pub tesseract_cmd: PathBuf,
    pub default_lang: String,
    pub vision: VisionConfig,
}

/// How the persisted page image is referenced in the chat request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTransport {
    /// `file://` URL; the model server must be allowed to read local media
    File,
    /// base64 data URL read back from the persisted page
    Inline,
}

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub base_model: Option<String>,
    pub adapter_model: Option<String>,
    pub max_tokens: u32,
    pub image_transport: ImageTransport,
}

impl VisionConfig {
    /// Model name to request: the fine-tuned adapter when one is served, else the base model
    pub fn served_model(&self) -> Option<&str> {
        self.adapter_model
            .as_deref()
            .or(self.base_model.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageBackend {
    None,
    Ollama,
}

#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub backend: LanguageBackend,
    pub url: String,
    pub model: String,
    pub max_length: u32,
    pub echo_prompt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsBackend {
    /// Free translate-TTS endpoint, selected by language code
    Google,
    /// ElevenLabs voice cloud, selected by voice name
    ElevenLabs,
}

#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub backend: TtsBackend,
    pub default_lang: String,
    pub default_voice: String,
    pub elevenlabs: ElevenLabsConfig,
}

#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model_id: String,
    pub output_format: String,
    pub voices_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Map caller mistakes to 400 instead of the historical blanket 500
    pub strict_status_codes: bool,
    /// Mirror the request origin and allow credentials
    pub cors_allow_credentials: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            ocr: OcrConfig {
                backend: OcrBackend::Tesseract,
                tesseract_cmd: PathBuf::from("tesseract"),
                default_lang: "ara".to_string(),
                vision: VisionConfig {
                    api_url: "http://localhost:8001/v1".to_string(),
                    api_key: None,
                    base_model: None,
                    adapter_model: None,
                    max_tokens: 1024,
                    image_transport: ImageTransport::Inline,
                },
            },
            language: LanguageConfig {
                backend: LanguageBackend::None,
                url: "http://localhost:11434".to_string(),
                model: "llama3.2:1b".to_string(),
                max_length: 500,
                echo_prompt: false,
            },
            tts: TtsConfig {
                backend: TtsBackend::Google,
                default_lang: "ar".to_string(),
                default_voice: "Aisha".to_string(),
                elevenlabs: ElevenLabsConfig {
                    api_key: None,
                    base_url: "https://api.elevenlabs.io".to_string(),
                    model_id: "eleven_multilingual_v2".to_string(),
                    output_format: "mp3_44100_128".to_string(),
                    voices_file: None,
                },
            },
            http: HttpConfig {
                strict_status_codes: false,
                cors_allow_credentials: false,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ocr_backend = match get("OCR_BACKEND").as_deref() {
            None | Some("tesseract") => OcrBackend::Tesseract,
            Some("vision") | Some("vlm") => OcrBackend::Vision,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "OCR_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let image_transport = match get("VISION_IMAGE_TRANSPORT").as_deref() {
            None | Some("inline") => ImageTransport::Inline,
            Some("file") => ImageTransport::File,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "VISION_IMAGE_TRANSPORT",
                    value: other.to_string(),
                })
            }
        };

        let vision = VisionConfig {
            api_url: get("VISION_API_URL").unwrap_or(defaults.ocr.vision.api_url),
            api_key: get("VISION_API_KEY"),
            base_model: get("BASE_MODEL_ID"),
            adapter_model: get("ADAPTER_MODEL_ID"),
            max_tokens: parse_or("MAX_TOKENS", get("MAX_TOKENS"), defaults.ocr.vision.max_tokens)?,
            image_transport,
        };

        if ocr_backend == OcrBackend::Vision && vision.base_model.is_none() {
            return Err(ConfigError::Missing("BASE_MODEL_ID"));
        }

        let language_backend = match get("LLM_BACKEND").as_deref() {
            None | Some("none") => LanguageBackend::None,
            Some("ollama") => LanguageBackend::Ollama,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LLM_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let tts_backend = match get("TTS_BACKEND").as_deref() {
            None | Some("google") | Some("gtts") => TtsBackend::Google,
            Some("elevenlabs") => TtsBackend::ElevenLabs,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "TTS_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let elevenlabs_key = get("ELEVENLABS_API_KEY");
        if tts_backend == TtsBackend::ElevenLabs && elevenlabs_key.is_none() {
            return Err(ConfigError::Missing("ELEVENLABS_API_KEY"));
        }

        Ok(Config {
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or("SERVER_PORT", get("SERVER_PORT"), defaults.server.port)?,
            },
            ocr: OcrConfig {
                backend: ocr_backend,
                tesseract_cmd: get("TESSERACT_CMD")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.ocr.tesseract_cmd),
                default_lang: get("OCR_DEFAULT_LANG").unwrap_or(defaults.ocr.default_lang),
                vision,
            },
            language: LanguageConfig {
                backend: language_backend,
                url: get("LLM_URL").unwrap_or(defaults.language.url),
                model: get("LLM_MODEL").unwrap_or(defaults.language.model),
                max_length: parse_or(
                    "LLM_MAX_LENGTH",
                    get("LLM_MAX_LENGTH"),
                    defaults.language.max_length,
                )?,
                echo_prompt: parse_or("LLM_ECHO_PROMPT", get("LLM_ECHO_PROMPT"), false)?,
            },
            tts: TtsConfig {
                backend: tts_backend,
                default_lang: get("TTS_DEFAULT_LANG").unwrap_or(defaults.tts.default_lang),
                default_voice: get("TTS_DEFAULT_VOICE").unwrap_or(defaults.tts.default_voice),
                elevenlabs: ElevenLabsConfig {
                    api_key: elevenlabs_key,
                    base_url: get("ELEVENLABS_BASE_URL")
                        .unwrap_or(defaults.tts.elevenlabs.base_url),
                    model_id: get("ELEVENLABS_MODEL_ID")
                        .unwrap_or(defaults.tts.elevenlabs.model_id),
                    output_format: get("ELEVENLABS_OUTPUT_FORMAT")
                        .unwrap_or(defaults.tts.elevenlabs.output_format),
                    voices_file: get("ELEVENLABS_VOICES_FILE").map(PathBuf::from),
                },
            },
            http: HttpConfig {
                strict_status_codes: parse_or(
                    "STRICT_STATUS_CODES",
                    get("STRICT_STATUS_CODES"),
                    false,
                )?,
                cors_allow_credentials: parse_or(
                    "CORS_ALLOW_CREDENTIALS",
                    get("CORS_ALLOW_CREDENTIALS"),
                    false,
                )?,
            },
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
