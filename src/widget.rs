//! Drop widget
//!
//! Composes the drop target, the selection manager and the upload
//! coordinator into the single state object front-ends drive. Every error
//! that reaches this layer becomes a [`Notice`] the user has to dismiss.

use crate::config::{Config, UploadConfig};
use crate::drop_target::{DragState, DropTarget};
use crate::selection::{AcceptPolicy, DecodeTicket, DecodedFile, Selection, SelectionManager};
use crate::types::{AppResult, Notice, UploadError};
use crate::upload::{MediaHost, UploadCoordinator, UploadJob, UploadState, UploadedAsset};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct DropWidget {
    target: DropTarget,
    selections: SelectionManager,
    uploader: UploadCoordinator,
    notice: Option<Notice>,
}

impl DropWidget {
    pub fn new(config: &Config) -> Self {
        let policy = config.drop.accept;
        Self {
            target: DropTarget::new(policy),
            selections: SelectionManager::new(),
            uploader: UploadCoordinator::cloudinary(config.upload.clone(), policy),
            notice: None,
        }
    }

    pub fn with_host(upload: UploadConfig, policy: AcceptPolicy, host: Arc<dyn MediaHost>) -> Self {
        Self {
            target: DropTarget::new(policy),
            selections: SelectionManager::new(),
            uploader: UploadCoordinator::new(upload, policy, host),
            notice: None,
        }
    }

    pub fn policy(&self) -> AcceptPolicy {
        self.target.policy()
    }

    pub fn target(&self) -> &DropTarget {
        &self.target
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selections.current()
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.selection().and_then(|s| s.remote_url.as_deref())
    }

    pub fn is_decoding(&self) -> bool {
        self.selections.is_decoding()
    }

    pub fn upload_state(&self) -> UploadState {
        self.uploader.state()
    }

    pub fn upload_config(&self) -> &UploadConfig {
        self.uploader.config()
    }

    pub fn host(&self) -> Arc<dyn MediaHost> {
        self.uploader.host()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Raise a notice that is not tied to an error.
    pub fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Whether the upload trigger is live.
    pub fn can_upload(&self) -> bool {
        self.selection().is_some_and(|s| s.remote_url.is_none()) && !self.uploader.is_uploading()
    }

    pub fn set_drag_state(&mut self, state: DragState) {
        match state {
            DragState::Active => self.target.drag_enter(),
            DragState::Idle => self.target.drag_leave(),
        }
    }

    /// Hand dropped paths to the drop target and start decoding the
    /// accepted file, if any.
    pub fn drop_files(&mut self, paths: Vec<PathBuf>) -> Option<DecodeTicket> {
        let offer = self.target.offer(paths);

        if offer.accepted.is_empty() {
            if let Some((path, reason)) = offer.rejected.first() {
                let err = UploadError::FileRejected(format!("{}: {}", path.display(), reason));
                self.notice = Some(Notice::from(&err));
            }
            return None;
        }

        self.uploader.reset();
        self.selections.begin(offer.accepted)
    }

    /// Apply a finished decode. Returns whether it became the selection.
    pub fn complete_decode(&mut self, ticket: DecodeTicket, decoded: AppResult<DecodedFile>) -> bool {
        match self.selections.commit(ticket, decoded) {
            Ok(committed) => committed,
            Err(err) => {
                self.notice = Some(Notice::from(&err));
                false
            }
        }
    }

    /// Drop and decode in one step.
    pub async fn select(&mut self, paths: Vec<PathBuf>) -> bool {
        let Some(ticket) = self.drop_files(paths) else {
            return false;
        };
        let decoded = crate::selection::decode_file(&ticket.path).await;
        self.complete_decode(ticket, decoded)
    }

    /// Start an upload. `Ok(None)` when one is already in flight.
    pub fn start_upload(&mut self) -> AppResult<Option<UploadJob>> {
        self.uploader
            .begin(self.selections.current())
            .inspect_err(|err| self.notice = Some(Notice::from(err)))
    }

    pub fn complete_upload(
        &mut self,
        job: UploadJob,
        result: AppResult<UploadedAsset>,
    ) -> AppResult<Option<String>> {
        self.uploader
            .finish(job, result, &mut self.selections)
            .inspect_err(|err| self.notice = Some(Notice::from(err)))
    }

    /// Upload the current selection and wait for the response.
    pub async fn upload(&mut self) -> AppResult<Option<String>> {
        let result = self.uploader.upload(&mut self.selections).await;
        if let Err(err) = &result {
            self.notice = Some(Notice::from(err));
        }
        result
    }

    /// Cancel: clear the selection, its URL and any upload result, and put
    /// the drop target back into its empty state.
    pub fn cancel(&mut self) {
        if self.selections.reset() {
            info!("Drop zone reset");
        }
        self.uploader.reset();
        self.target.reset();
    }
}
