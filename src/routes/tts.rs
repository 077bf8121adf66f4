//! Text-to-speech route

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
};

use super::form::FormFields;
use crate::error::{ApiError, AppError};
use crate::state::AppState;

/// POST /tts
///
/// Form fields: `text` (required), `voice` and `lang` (optional; which one
/// matters depends on the configured backend). Returns the MP3 as an
/// attachment named `output.mp3`.
pub async fn text_to_speech(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Response, ApiError> {
    let errors = state.errors();

    let text = form
        .field("text")
        .ok_or_else(|| errors.render(AppError::BadRequest("Field 'text' is required".to_string())))?;

    let audio = state
        .tts()
        .synthesize(text, form.field("voice"), form.field("lang"))
        .await
        .map_err(|e| errors.render(e))?;

    let bytes = audio.into_bytes().await.map_err(|e| errors.render(e))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"output.mp3\"",
        )
        .body(Body::from(bytes))
        .map_err(|e| errors.render(AppError::Internal(e.to_string())))
}
