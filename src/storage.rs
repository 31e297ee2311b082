use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ServiceError;

/// Handle returned by the storage backend for an uploaded document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub id: String,
    /// Shareable link to the uploaded file.
    pub web_view_link: String,
}

#[async_trait]
pub trait ObjectStorage {
    async fn upload_file(
        &self,
        filename: &str,
        file_data: &[u8],
    ) -> Result<StoredObject, ServiceError>;
}
