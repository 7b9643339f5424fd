//! Accepted-type policy shared by the drop target and the upload endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptPolicy {
    /// Only `image/*` files reach the selection manager.
    #[default]
    ImagesOnly,
    /// Any file type, with richer metadata in the preview.
    Any,
}

impl AcceptPolicy {
    pub fn accepts(&self, mime_type: &str) -> bool {
        match self {
            AcceptPolicy::Any => true,
            AcceptPolicy::ImagesOnly => mime_type
                .parse::<mime::Mime>()
                .map(|m| m.type_() == mime::IMAGE)
                .unwrap_or(false),
        }
    }

    /// MIME pattern registered with the drop target.
    pub fn pattern(&self) -> &'static str {
        match self {
            AcceptPolicy::ImagesOnly => "image/*",
            AcceptPolicy::Any => "*/*",
        }
    }

    /// Resource segment of the upload endpoint path.
    pub fn resource_type(&self) -> &'static str {
        match self {
            AcceptPolicy::ImagesOnly => "image",
            AcceptPolicy::Any => "auto",
        }
    }

    pub fn shows_extended_metadata(&self) -> bool {
        matches!(self, AcceptPolicy::Any)
    }
}
