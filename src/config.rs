use anyhow::{bail, Result};
use serde::Deserialize;
use std::env;

use crate::selection::AcceptPolicy;

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub upload: UploadConfig,
    pub drop: DropConfig,
    pub logging: LoggingConfig,
}

/// Destination and credential for the media host.
///
/// Both values are optional at load time. Their absence only matters when an
/// upload is attempted, where it surfaces as `UploadError::ConfigMissing`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub cloud_name: Option<String>,
    pub upload_preset: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropConfig {
    pub accept: AcceptPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub log_dir: Option<String>,
}

impl UploadConfig {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            cloud_name: Some(cloud_name.into()),
            upload_preset: Some(upload_preset.into()),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Both the destination identifier and the credential, if present and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let cloud = self.cloud_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let preset = self.upload_preset.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((cloud, preset))
    }

    pub fn is_complete(&self) -> bool {
        self.credentials().is_some()
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            upload_preset: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            upload: UploadConfig {
                cloud_name: non_empty_var("CLOUDINARY_CLOUD_NAME"),
                upload_preset: non_empty_var("CLOUDINARY_UPLOAD_PRESET"),
                api_base: env::var("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
            drop: DropConfig {
                accept: parse_accept(&env::var("DROP_ACCEPT").unwrap_or_else(|_| "image".to_string()))?,
            },
            logging: LoggingConfig {
                filter: env::var("RUST_LOG").unwrap_or_else(|_| "oxidized_drop=info".to_string()),
                log_dir: env::var("DROP_LOG_DIR").ok(),
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn parse_accept(value: &str) -> Result<AcceptPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "image" | "images" | "image/*" => Ok(AcceptPolicy::ImagesOnly),
        "any" | "all" | "*/*" => Ok(AcceptPolicy::Any),
        other => bail!("DROP_ACCEPT must be 'image' or 'any', got '{}'", other),
    }
}
