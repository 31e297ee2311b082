use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use futures::StreamExt;
use serde_json::{Map, Value};

use crate::voucher::models::VoucherForm;

#[derive(Debug, thiserror::Error)]
pub enum FormParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("Unexpected file field '{0}'")]
    UnexpectedFile(String),
    #[error("Field '{0}' is not valid UTF-8")]
    Utf8Error(String),
    #[error("Request body is larger than {0} bytes")]
    TooLarge(usize),
    #[error("Invalid form data: {0}")]
    Invalid(String),
}

impl FormParseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Collect the text fields of a `multipart/form-data` submission into a
/// [`VoucherForm`]. File parts are rejected.
pub async fn parse_voucher_multipart(
    mut multipart: Multipart,
    limit: usize,
) -> Result<VoucherForm, FormParseError> {
    let mut fields = Map::new();
    let mut received = 0usize;

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| FormParseError::FieldError(e.to_string()))?;
        let content_disposition = field.content_disposition().ok_or_else(|| {
            FormParseError::FieldError("Content disposition not found".to_string())
        })?;
        let name = content_disposition
            .get_name()
            .ok_or_else(|| FormParseError::FieldError("Field name not found".to_string()))?
            .to_string();

        if content_disposition.get_filename().is_some() {
            return Err(FormParseError::UnexpectedFile(name));
        }

        let mut buffer = Vec::new();
        while let Some(chunk) = field.next().await {
            let data_chunk = chunk.map_err(|e| FormParseError::FieldError(e.to_string()))?;
            received += data_chunk.len();
            if received > limit {
                return Err(FormParseError::TooLarge(limit));
            }
            buffer.extend_from_slice(&data_chunk);
        }

        let value = String::from_utf8(buffer).map_err(|_| FormParseError::Utf8Error(name.clone()))?;
        fields.insert(name, Value::String(value));
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| FormParseError::Invalid(e.to_string()))
}
