//! Google Workspace clients backing the spreadsheet and storage seams.
//!
//! - `auth` - service-account OAuth2 tokens
//! - `sheets` - Sheets v4 values and tab management
//! - `drive` - Drive v3 multipart uploads

pub mod auth;
pub mod drive;
pub mod sheets;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use drive::GoogleDrive;
pub use sheets::GoogleSheets;

use crate::error::ServiceError;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Turn a non-success response into `ServiceError::Status` carrying its body.
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}
