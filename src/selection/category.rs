//! Display categories for selected files.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Pdf,
    Archive,
    WordProcessing,
    Spreadsheet,
    Text,
    Generic,
}

const ARCHIVE_MARKERS: &[&str] = &["zip", "rar", "7z", "tar", "gzip", "compressed"];
const WORD_MARKERS: &[&str] = &["word", "opendocument.text"];
const SPREADSHEET_MARKERS: &[&str] = &["excel", "spreadsheet", "csv"];

/// Map a MIME type to its display category.
///
/// Total over all inputs: unknown or absent types map to `Generic`.
/// Rules are checked in order and the first match wins, so `text/csv`
/// is a spreadsheet rather than plain text.
pub fn describe(mime_type: Option<&str>) -> FileCategory {
    let Some(raw) = mime_type else {
        return FileCategory::Generic;
    };
    let mime = raw.trim().to_ascii_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|m| mime.contains(m));

    if mime.starts_with("image/") {
        FileCategory::Image
    } else if mime.starts_with("video/") {
        FileCategory::Video
    } else if mime.starts_with("audio/") {
        FileCategory::Audio
    } else if mime.contains("pdf") {
        FileCategory::Pdf
    } else if contains_any(ARCHIVE_MARKERS) {
        FileCategory::Archive
    } else if contains_any(WORD_MARKERS) {
        FileCategory::WordProcessing
    } else if contains_any(SPREADSHEET_MARKERS) {
        FileCategory::Spreadsheet
    } else if mime.starts_with("text/") {
        FileCategory::Text
    } else {
        FileCategory::Generic
    }
}

impl FileCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FileCategory::Image => "Image",
            FileCategory::Video => "Video",
            FileCategory::Audio => "Audio",
            FileCategory::Pdf => "PDF document",
            FileCategory::Archive => "Archive",
            FileCategory::WordProcessing => "Word document",
            FileCategory::Spreadsheet => "Spreadsheet",
            FileCategory::Text => "Text",
            FileCategory::Generic => "File",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            FileCategory::Image => "🖼",
            FileCategory::Video => "🎞",
            FileCategory::Audio => "🎵",
            FileCategory::Pdf => "📕",
            FileCategory::Archive => "🗜",
            FileCategory::WordProcessing => "📝",
            FileCategory::Spreadsheet => "📊",
            FileCategory::Text => "📄",
            FileCategory::Generic => "📦",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
