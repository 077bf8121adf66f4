//! Backend status endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::ocr::OcrProvider;
use crate::state::AppState;
use crate::tts::TtsProvider;

/// Backend kind and whether it answered a probe
#[derive(Debug, Serialize)]
pub struct BackendStatus<B> {
    pub backend: B,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ocr: BackendStatus<OcrProvider>,
    pub tts: BackendStatus<TtsProvider>,
    /// `ollama:<model>` when a language backend is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<BackendStatus<String>>,
}

/// GET /status
///
/// Probes every configured backend. Unlike `/`, this reflects backend health.
pub async fn backend_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let language = async {
        match state.language() {
            Some(service) => Some(BackendStatus {
                backend: format!("ollama:{}", service.model()),
                available: service.is_available().await,
            }),
            None => None,
        }
    };

    let (ocr_available, tts_available, language) = tokio::join!(
        state.ocr().is_available(),
        state.tts().is_available(),
        language
    );

    Json(StatusResponse {
        ocr: BackendStatus {
            backend: state.ocr().provider(),
            available: ocr_available,
        },
        tts: BackendStatus {
            backend: state.tts().provider(),
            available: tts_available,
        },
        language,
    })
}
