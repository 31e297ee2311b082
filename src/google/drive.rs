//! Drive v3 uploads.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use std::sync::Arc;

use super::{check_status, TokenProvider};
use crate::error::ServiceError;
use crate::storage::{ObjectStorage, StoredObject};

const DRIVE_UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3/files";
const SERVICE: &str = "drive";

/// Uploads documents into a Drive folder and returns their share link.
pub struct GoogleDrive {
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
    folder_id: Option<String>,
    upload_url: String,
}

impl GoogleDrive {
    pub fn new(http: reqwest::Client, tokens: Arc<TokenProvider>, folder_id: Option<String>) -> Self {
        Self {
            http,
            tokens,
            folder_id,
            upload_url: DRIVE_UPLOAD_API.to_string(),
        }
    }

    fn metadata(&self, filename: &str) -> serde_json::Value {
        match &self.folder_id {
            Some(folder) => json!({ "name": filename, "parents": [folder] }),
            None => json!({ "name": filename }),
        }
    }
}

/// Body of a `multipart/related` upload: JSON metadata followed by the media.
fn multipart_related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[async_trait]
impl ObjectStorage for GoogleDrive {
    async fn upload_file(
        &self,
        filename: &str,
        file_data: &[u8],
    ) -> Result<StoredObject, ServiceError> {
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        let boundary = format!(
            "voucher-upload-{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let body = multipart_related_body(
            &boundary,
            &self.metadata(filename),
            mime.essence_str(),
            file_data,
        );

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(&self.upload_url)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id,webViewLink"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;
        let response = check_status(SERVICE, response).await?;

        let stored: StoredObject = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed(SERVICE, e))?;
        log::info!("Uploaded {} to Drive as {}", filename, stored.id);
        Ok(stored)
    }
}
