//! Form body extraction
//!
//! Every POST route accepts either `multipart/form-data` or
//! `application/x-www-form-urlencoded`, so clients can post a browser
//! `FormData` or a plain form alike.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};

use crate::error::{ApiError, AppError};
use crate::state::AppState;

/// Text fields and file parts of a submitted form
#[derive(Debug, Default)]
pub struct FormFields {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
}

impl FormFields {
    /// Text value of a field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Take the bytes of a file part, falling back to a text field of that name
    pub fn take_file(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files
            .remove(name)
            .or_else(|| self.fields.remove(name).map(String::into_bytes))
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormFields::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            let has_filename = field.file_name().is_some();

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read field '{}': {}", name, e)))?;

            tracing::debug!(field = %name, bytes = data.len(), file = has_filename, "Received form field");

            if has_filename {
                form.files.insert(name, data.to_vec());
            } else {
                match String::from_utf8(data.to_vec()) {
                    Ok(text) => {
                        form.fields.insert(name, text);
                    }
                    Err(e) => {
                        form.files.insert(name, e.into_bytes());
                    }
                }
            }
        }

        Ok(form)
    }
}

/// Media types are case-insensitive, so `Multipart/Form-Data` counts too
fn is_multipart_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("multipart/form-data"))
        .unwrap_or(false)
}

#[async_trait]
impl FromRequest<AppState> for FormFields {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(is_multipart_form)
            .unwrap_or(false);

        let errors = state.errors();

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| errors.render(AppError::BadRequest(e.body_text())))?;
            return Self::from_multipart(multipart)
                .await
                .map_err(|e| errors.render(e));
        }

        let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| errors.render(AppError::BadRequest(e.body_text())))?;

        Ok(FormFields {
            fields,
            files: HashMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_detection_ignores_case() {
        assert!(is_multipart_form("multipart/form-data; boundary=x"));
        assert!(is_multipart_form("Multipart/Form-Data; boundary=x"));
        assert!(is_multipart_form("MULTIPART/FORM-DATA"));
        assert!(!is_multipart_form("application/x-www-form-urlencoded"));
        assert!(!is_multipart_form("multipart/mixed; boundary=x"));
    }
}
