//! Turns a local file into a previewable representation.

use crate::types::{AppResult, UploadError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use std::path::Path;
use tokio::fs;
use tracing::debug;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Result of reading a file for preview and upload.
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub data_uri: String,
    pub bytes: Bytes,
}

/// Guess a MIME type from the file extension.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Human-readable size in MiB with two decimals, e.g. `1.50 MB`.
pub fn size_display(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / BYTES_PER_MIB)
}

pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

pub async fn decode_file(path: &Path) -> AppResult<DecodedFile> {
    let raw = fs::read(path)
        .await
        .map_err(|e| UploadError::Decode(format!("{}: {}", path.display(), e)))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = guess_mime(path);
    let data_uri = to_data_uri(&mime_type, &raw);

    debug!("Decoded {} ({} bytes, {})", name, raw.len(), mime_type);

    Ok(DecodedFile {
        name,
        size_bytes: raw.len() as u64,
        mime_type,
        data_uri,
        bytes: Bytes::from(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_size_display() {
        assert_eq!(size_display(0), "0.00 MB");
        assert_eq!(size_display(1024 * 1024), "1.00 MB");
        assert_eq!(size_display(1024 * 1024 * 3 / 2), "1.50 MB");
        assert_eq!(size_display(5000), "0.00 MB");
        assert_eq!(size_display(10_485), "0.01 MB");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(&PathBuf::from("cat.png")), "image/png");
        assert_eq!(guess_mime(&PathBuf::from("report.pdf")), "application/pdf");
        assert_eq!(guess_mime(&PathBuf::from("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_decode_file_builds_data_uri() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hi").unwrap();

        let decoded = decode_file(&path).await.unwrap();
        assert_eq!(decoded.name, "hello.txt");
        assert_eq!(decoded.mime_type, "text/plain");
        assert_eq!(decoded.size_bytes, 2);
        assert_eq!(decoded.data_uri, "data:text/plain;base64,aGk=");
        assert_eq!(&decoded.bytes[..], b"hi");
    }

    #[test]
    fn test_decode_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = tokio_test::block_on(decode_file(&dir.path().join("gone.png"))).unwrap_err();
        assert!(matches!(err, UploadError::Decode(_)));
    }
}
