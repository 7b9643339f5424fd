// Cloudinary unsigned upload
// API Reference: https://cloudinary.com/documentation/image_upload_api_reference
//
// POST {api_base}/{cloud_name}/{resource_type}/upload
// multipart fields: `file` (binary) and `upload_preset`

use crate::types::{AppResult, UploadError, GENERIC_UPLOAD_FAILURE};
use crate::upload::host::{MediaHost, UploadRequest, UploadedAsset};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

pub struct CloudinaryHost {
    client: Client,
}

#[derive(Deserialize)]
struct CloudinaryResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    public_id: Option<String>,
    #[serde(default)]
    bytes: Option<u64>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    error: Option<CloudinaryError>,
}

#[derive(Deserialize)]
struct CloudinaryError {
    #[serde(default)]
    message: Option<String>,
}

impl CloudinaryHost {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn endpoint(api_base: &str, cloud_name: &str, resource_type: &str) -> String {
        format!(
            "{}/{}/{}/upload",
            api_base.trim_end_matches('/'),
            cloud_name,
            resource_type
        )
    }
}

impl Default for CloudinaryHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a status and raw body into an asset or a user-facing error.
pub fn interpret_response(status: StatusCode, body: &str) -> AppResult<UploadedAsset> {
    let parsed: Option<CloudinaryResponse> = serde_json::from_str(body).ok();
    if parsed.is_none() {
        warn!("Upload response was not JSON ({} bytes, status {})", body.len(), status);
    }

    let error_message = parsed
        .as_ref()
        .and_then(|p| p.error.as_ref())
        .and_then(|e| e.message.clone())
        .filter(|m| !m.trim().is_empty());

    if !status.is_success() {
        return Err(UploadError::ServerRejected(
            error_message.unwrap_or_else(|| GENERIC_UPLOAD_FAILURE.to_string()),
        ));
    }

    match parsed {
        Some(CloudinaryResponse {
            secure_url: Some(secure_url),
            public_id,
            bytes,
            format,
            ..
        }) => Ok(UploadedAsset {
            secure_url,
            public_id,
            bytes,
            format,
        }),
        _ => Err(UploadError::ServerRejected(
            error_message.unwrap_or_else(|| GENERIC_UPLOAD_FAILURE.to_string()),
        )),
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, request: UploadRequest) -> AppResult<UploadedAsset> {
        let part = Part::bytes(request.bytes.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", request.upload_preset.clone());

        debug!("POST {} ({} bytes)", request.endpoint, request.bytes.len());
        let response = self.client.post(&request.endpoint).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        let asset = interpret_response(status, &body)?;

        info!(
            "Cloudinary accepted {} as {} ({})",
            request.file_name,
            asset.public_id.as_deref().unwrap_or("<unknown id>"),
            asset.format.as_deref().unwrap_or("?")
        );
        Ok(asset)
    }
}
