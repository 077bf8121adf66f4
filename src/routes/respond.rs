//! Text generation route

use axum::{extract::State, Json};

use super::form::FormFields;
use crate::error::{ApiError, AppError};
use crate::language::Generation;
use crate::state::AppState;

/// POST /respond
pub async fn generate_response(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Json<Generation>, ApiError> {
    let errors = state.errors();

    let language = state
        .language()
        .ok_or_else(|| errors.render(AppError::Internal("No language model configured".to_string())))?;

    let text = form
        .field("text")
        .ok_or_else(|| errors.render(AppError::BadRequest("Field 'text' is required".to_string())))?;

    let generation = language.generate(text).await.map_err(|e| errors.render(e))?;

    Ok(Json(generation))
}
