// Type definitions and enums

use chrono::{DateTime, Utc};

/// Fallback message when the host rejects an upload without saying why.
pub const GENERIC_UPLOAD_FAILURE: &str = "Upload failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file selected!")]
    NoFileSelected,

    #[error("Cloudinary configuration missing!")]
    ConfigMissing,

    #[error("{0}")]
    TransportFailure(String),

    #[error("{0}")]
    ServerRejected(String),

    #[error("File rejected: {0}")]
    FileRejected(String),

    #[error("Could not read file: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::TransportFailure(err.to_string())
    }
}

pub type AppResult<T> = std::result::Result<T, UploadError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message that must be acknowledged by the user before the widget
/// accepts further input.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

impl From<&UploadError> for Notice {
    fn from(err: &UploadError) -> Self {
        Notice::error(err.to_string())
    }
}
