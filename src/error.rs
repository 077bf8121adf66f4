//! Error types for the OCR / voice server
//!
//! Adapters return their own typed errors. They are folded into [`AppError`]
//! at the HTTP boundary and rendered as the `{"error": "..."}` envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::language::LanguageError;
use crate::ocr::OcrError;
use crate::tts::TtsError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error(transparent)]
    Tts(#[from] TtsError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Whether the request itself was at fault (bad input, unknown voice, ...)
    pub fn is_client_error(&self) -> bool {
        match self {
            AppError::Ocr(e) => e.is_client_error(),
            AppError::Language(e) => e.is_client_error(),
            AppError::Tts(e) => e.is_client_error(),
            AppError::BadRequest(_) => true,
            AppError::Internal(_) => false,
        }
    }
}

/// Decides which status an [`AppError`] is rendered with
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorPolicy {
    /// When false every failure is a 500, which is what existing clients expect
    pub strict_status_codes: bool,
}

impl ErrorPolicy {
    pub fn render(&self, err: impl Into<AppError>) -> ApiError {
        let err = err.into();
        let client_fault = err.is_client_error();

        if client_fault {
            tracing::warn!("Rejected request: {}", err);
        } else {
            tracing::error!("Request failed: {}", err);
        }

        let status = if client_fault && self.strict_status_codes {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

/// Rendered error: a status plus the JSON error envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::TtsError;

    #[test]
    fn test_default_policy_maps_everything_to_500() {
        let policy = ErrorPolicy::default();
        let rendered = policy.render(TtsError::UnknownVoice {
            requested: "Nobody".to_string(),
            supported: vec!["Aisha".to_string()],
        });
        assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(rendered.message.contains("Aisha"));
    }

    #[test]
    fn test_strict_policy_separates_caller_faults() {
        let policy = ErrorPolicy {
            strict_status_codes: true,
        };
        let caller = policy.render(AppError::BadRequest("text must not be empty".to_string()));
        assert_eq!(caller.status, StatusCode::BAD_REQUEST);

        let backend = policy.render(TtsError::Api("503 Service Unavailable".to_string()));
        assert_eq!(backend.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
