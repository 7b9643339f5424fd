use crate::types::AppResult;
use async_trait::async_trait;
use bytes::Bytes;

/// One multipart submission to a media host.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub endpoint: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
    pub upload_preset: String,
}

/// What the host returned for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub secure_url: String,
    pub public_id: Option<String>,
    pub bytes: Option<u64>,
    pub format: Option<String>,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Issue exactly one request. Implementations must not retry.
    async fn upload(&self, request: UploadRequest) -> AppResult<UploadedAsset>;
}
