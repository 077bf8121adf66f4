//! OCR route

use axum::{extract::State, Json};

use super::form::FormFields;
use crate::error::ApiError;
use crate::ocr::{ExtractionResult, OcrError};
use crate::state::AppState;

/// POST /ocr
///
/// Multipart upload with the page in `file` (or `image`) and an optional `lang`.
pub async fn extract_text(
    State(state): State<AppState>,
    mut form: FormFields,
) -> Result<Json<ExtractionResult>, ApiError> {
    let errors = state.errors();

    let image = form
        .take_file("file")
        .or_else(|| form.take_file("image"))
        .ok_or_else(|| errors.render(OcrError::MissingImage))?;

    let result = state
        .ocr()
        .extract_text(image, form.field("lang"))
        .await
        .map_err(|e| errors.render(e))?;

    Ok(Json(result))
}
