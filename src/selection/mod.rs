//! Selection and Preview Manager
//!
//! Holds the one file currently chosen for upload, its preview and the
//! metadata derived from it when it was selected.
//!
//! Decoding is split into [`SelectionManager::begin`] and
//! [`SelectionManager::commit`] so it can run on another task. Every attempt
//! gets a version number; only the result matching the latest attempt is
//! committed, so a slow decode of an earlier drop can never overwrite a
//! later one.

mod category;
mod decode;
mod policy;

pub use category::{describe, FileCategory};
pub use decode::{decode_file, guess_mime, size_display, to_data_uri, DecodedFile};
pub use policy::AcceptPolicy;

use crate::types::AppResult;
use bytes::Bytes;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// The file currently held for upload.
#[derive(Debug, Clone)]
pub struct Selection {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub size_display: String,
    pub category: FileCategory,
    /// `data:` URI of the file contents, for preview only.
    pub content: String,
    pub bytes: Bytes,
    pub remote_url: Option<String>,
    version: u64,
}

impl Selection {
    fn from_decoded(decoded: DecodedFile, version: u64) -> Self {
        Self {
            category: describe(Some(&decoded.mime_type)),
            size_display: size_display(decoded.size_bytes),
            name: decoded.name,
            mime_type: decoded.mime_type,
            size_bytes: decoded.size_bytes,
            content: decoded.data_uri,
            bytes: decoded.bytes,
            remote_url: None,
            version,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Handle for one in-flight decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTicket {
    pub path: PathBuf,
    version: u64,
}

impl DecodeTicket {
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Default)]
pub struct SelectionManager {
    current: Option<Selection>,
    version: u64,
    pending: Option<u64>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_decoding(&self) -> bool {
        self.pending.is_some()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Start a new selection from the offered files.
    ///
    /// Single-file policy: only the first file is kept, any others are
    /// ignored. The previous selection, including its uploaded URL, is
    /// cleared immediately so nothing stale stays visible while the new
    /// file decodes. Returns `None` when no file was offered.
    pub fn begin(&mut self, files: Vec<PathBuf>) -> Option<DecodeTicket> {
        let extra = files.len().saturating_sub(1);
        let path = files.into_iter().next()?;
        if extra > 0 {
            warn!("{} additional file(s) ignored, only one file can be selected", extra);
        }

        self.version += 1;
        self.current = None;
        self.pending = Some(self.version);
        debug!("Decode #{} started for {}", self.version, path.display());

        Some(DecodeTicket {
            path,
            version: self.version,
        })
    }

    /// Commit a finished decode.
    ///
    /// Returns `Ok(false)` when the ticket was superseded by a later
    /// `begin` or a `reset`; the result is dropped in that case, errors
    /// included.
    pub fn commit(&mut self, ticket: DecodeTicket, decoded: AppResult<DecodedFile>) -> AppResult<bool> {
        if ticket.version != self.version {
            debug!(
                "Discarding stale decode #{} (latest is #{})",
                ticket.version, self.version
            );
            return Ok(false);
        }
        self.pending = None;

        let selection = Selection::from_decoded(decoded?, ticket.version);
        info!(
            "Selected {} ({}, {})",
            selection.name, selection.mime_type, selection.size_display
        );
        self.current = Some(selection);
        Ok(true)
    }

    /// Decode the first offered file and commit it.
    pub async fn select(&mut self, files: Vec<PathBuf>) -> AppResult<bool> {
        let Some(ticket) = self.begin(files) else {
            return Ok(false);
        };
        let decoded = decode_file(&ticket.path).await;
        self.commit(ticket, decoded)
    }

    /// Clear the selection and invalidate any pending decode. Returns whether
    /// anything was cleared.
    pub fn reset(&mut self) -> bool {
        let had_state = self.current.is_some() || self.pending.is_some();
        self.version += 1;
        self.current = None;
        self.pending = None;
        if had_state {
            info!("Selection cleared");
        }
        had_state
    }

    /// Record the remote URL for the selection with the given version.
    ///
    /// Ignored if the selection has since been replaced or cleared.
    pub fn set_remote_url(&mut self, version: u64, url: String) -> bool {
        match self.current.as_mut() {
            Some(selection) if selection.version == version => {
                selection.remote_url = Some(url);
                true
            }
            _ => {
                warn!("Upload result for superseded selection #{} dropped", version);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UploadError;

    fn decoded(name: &str, mime: &str) -> DecodedFile {
        DecodedFile {
            name: name.to_string(),
            mime_type: mime.to_string(),
            size_bytes: 3,
            data_uri: to_data_uri(mime, b"abc"),
            bytes: Bytes::from_static(b"abc"),
        }
    }

    #[test]
    fn test_begin_keeps_first_file_only() {
        let mut manager = SelectionManager::new();
        let ticket = manager
            .begin(vec![PathBuf::from("a.png"), PathBuf::from("b.png")])
            .unwrap();
        assert_eq!(ticket.path, PathBuf::from("a.png"));
        assert!(manager.is_decoding());
        assert!(manager.current().is_none());

        assert!(manager.begin(Vec::new()).is_none());
    }

    #[test]
    fn test_commit_populates_metadata() {
        let mut manager = SelectionManager::new();
        let ticket = manager.begin(vec![PathBuf::from("a.png")]).unwrap();
        assert!(manager.commit(ticket, Ok(decoded("a.png", "image/png"))).unwrap());

        let selection = manager.current().unwrap();
        assert_eq!(selection.name, "a.png");
        assert_eq!(selection.category, FileCategory::Image);
        assert_eq!(selection.size_display, "0.00 MB");
        assert!(selection.content.starts_with("data:image/png;base64,"));
        assert!(selection.remote_url.is_none());
        assert!(!manager.is_decoding());
    }

    #[test]
    fn test_stale_decode_is_discarded() {
        let mut manager = SelectionManager::new();
        let first = manager.begin(vec![PathBuf::from("first.png")]).unwrap();
        let second = manager.begin(vec![PathBuf::from("second.png")]).unwrap();

        // Second finishes first, then the slow first decode arrives.
        assert!(manager.commit(second, Ok(decoded("second.png", "image/png"))).unwrap());
        assert!(!manager.commit(first, Ok(decoded("first.png", "image/png"))).unwrap());

        assert_eq!(manager.current().unwrap().name, "second.png");
    }

    #[test]
    fn test_stale_decode_error_is_discarded() {
        let mut manager = SelectionManager::new();
        let first = manager.begin(vec![PathBuf::from("first.png")]).unwrap();
        manager.reset();
        let result = manager.commit(first, Err(UploadError::Decode("boom".into())));
        assert_eq!(result, Ok(false));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut manager = SelectionManager::new();
        let ticket = manager.begin(vec![PathBuf::from("a.png")]).unwrap();
        manager.commit(ticket, Ok(decoded("a.png", "image/png"))).unwrap();
        let version = manager.current().unwrap().version();
        assert!(manager.set_remote_url(version, "https://x/y.png".into()));

        assert!(manager.reset());
        assert!(manager.current().is_none());
        assert!(!manager.is_decoding());

        // Idempotent
        assert!(!manager.reset());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_reset_during_decode_drops_result() {
        let mut manager = SelectionManager::new();
        let ticket = manager.begin(vec![PathBuf::from("a.png")]).unwrap();
        assert!(manager.reset());
        assert!(!manager.commit(ticket, Ok(decoded("a.png", "image/png"))).unwrap());
        assert!(manager.current().is_none());
    }

    #[test]
    fn test_new_selection_clears_remote_url() {
        let mut manager = SelectionManager::new();
        let ticket = manager.begin(vec![PathBuf::from("a.png")]).unwrap();
        manager.commit(ticket, Ok(decoded("a.png", "image/png"))).unwrap();
        let version = manager.current().unwrap().version();
        manager.set_remote_url(version, "https://x/a.png".into());

        let ticket = manager.begin(vec![PathBuf::from("b.png")]).unwrap();
        assert!(manager.current().is_none());
        manager.commit(ticket, Ok(decoded("b.png", "image/png"))).unwrap();
        assert!(manager.current().unwrap().remote_url.is_none());

        // A late result for the old selection must not attach to the new one.
        assert!(!manager.set_remote_url(version, "https://x/a.png".into()));
        assert!(manager.current().unwrap().remote_url.is_none());
    }

    #[test]
    fn test_decode_error_clears_pending() {
        let mut manager = SelectionManager::new();
        let ticket = manager.begin(vec![PathBuf::from("a.png")]).unwrap();
        let err = manager
            .commit(ticket, Err(UploadError::Decode("denied".into())))
            .unwrap_err();
        assert!(matches!(err, UploadError::Decode(_)));
        assert!(!manager.is_decoding());
        assert!(manager.current().is_none());
    }

    #[tokio::test]
    async fn test_select_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let mut manager = SelectionManager::new();
        assert!(manager.select(vec![path]).await.unwrap());
        let selection = manager.current().unwrap();
        assert_eq!(selection.name, "pixel.png");
        assert_eq!(selection.mime_type, "image/png");
        assert_eq!(selection.size_bytes, 4);
    }
}
