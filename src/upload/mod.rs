//! Upload Coordinator
//!
//! ```text
//!   Idle ──upload()──▶ Uploading ──ok──▶ Succeeded
//!                          │
//!                          └──error──▶ Failed
//!   Succeeded | Failed ──reset / new selection──▶ Idle
//! ```
//!
//! `upload()` is `begin` + one request + `finish`. The split lets the TUI
//! run the request on a spawned task while the coordinator stays owned by
//! the event loop. While `Uploading`, and once the selection carries a URL,
//! `begin` returns `Ok(None)` and sends nothing.

pub mod cloudinary;
pub mod host;

pub use cloudinary::CloudinaryHost;
pub use host::{MediaHost, UploadRequest, UploadedAsset};

use crate::config::UploadConfig;
use crate::selection::{AcceptPolicy, Selection, SelectionManager};
use crate::types::{AppResult, UploadError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

/// An upload that has been started and must be handed back to `finish`.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub request: UploadRequest,
    selection_version: u64,
}

impl UploadJob {
    pub fn selection_version(&self) -> u64 {
        self.selection_version
    }
}

pub struct UploadCoordinator {
    config: UploadConfig,
    policy: AcceptPolicy,
    host: Arc<dyn MediaHost>,
    state: UploadState,
    last_error: Option<String>,
}

impl UploadCoordinator {
    pub fn new(config: UploadConfig, policy: AcceptPolicy, host: Arc<dyn MediaHost>) -> Self {
        Self {
            config,
            policy,
            host,
            state: UploadState::Idle,
            last_error: None,
        }
    }

    pub fn cloudinary(config: UploadConfig, policy: AcceptPolicy) -> Self {
        Self::new(config, policy, Arc::new(CloudinaryHost::new()))
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn is_uploading(&self) -> bool {
        self.state == UploadState::Uploading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn host(&self) -> Arc<dyn MediaHost> {
        Arc::clone(&self.host)
    }

    /// Check preconditions and enter `Uploading`.
    ///
    /// `Ok(None)` means an upload is already in flight or the selection has
    /// already been uploaded. Precondition errors leave the state untouched.
    pub fn begin(&mut self, selection: Option<&Selection>) -> AppResult<Option<UploadJob>> {
        if self.is_uploading() {
            warn!("Upload already in progress, ignoring trigger");
            return Ok(None);
        }

        let Some(selection) = selection else {
            return Err(self.reject(UploadError::NoFileSelected));
        };
        if self.state == UploadState::Succeeded || selection.remote_url.is_some() {
            debug!("{} is already uploaded, ignoring trigger", selection.name);
            return Ok(None);
        }
        let Some((cloud_name, preset)) = self
            .config
            .credentials()
            .map(|(cloud, preset)| (cloud.to_string(), preset.to_string()))
        else {
            return Err(self.reject(UploadError::ConfigMissing));
        };

        let endpoint =
            CloudinaryHost::endpoint(&self.config.api_base, &cloud_name, self.policy.resource_type());
        let request = UploadRequest {
            endpoint,
            file_name: selection.name.clone(),
            mime_type: selection.mime_type.clone(),
            bytes: selection.bytes.clone(),
            upload_preset: preset,
        };

        info!("Uploading {} ({})", selection.name, selection.size_display);
        self.state = UploadState::Uploading;
        self.last_error = None;

        Ok(Some(UploadJob {
            request,
            selection_version: selection.version(),
        }))
    }

    /// Apply the outcome of a job. Always leaves `Uploading`.
    ///
    /// If the selection changed while the request was in flight the URL is
    /// not recorded, the state returns to `Idle` and `Ok(None)` is returned.
    pub fn finish(
        &mut self,
        job: UploadJob,
        result: AppResult<UploadedAsset>,
        selections: &mut SelectionManager,
    ) -> AppResult<Option<String>> {
        let current = selections.current().map(Selection::version) == Some(job.selection_version);

        match result {
            Ok(asset) if current => {
                info!("Upload complete: {}", asset.secure_url);
                selections.set_remote_url(job.selection_version, asset.secure_url.clone());
                self.state = UploadState::Succeeded;
                Ok(Some(asset.secure_url))
            }
            Ok(asset) => {
                warn!(
                    "Upload of {} finished after the selection changed, discarding {}",
                    job.request.file_name, asset.secure_url
                );
                self.state = UploadState::Idle;
                Ok(None)
            }
            Err(err) => {
                error!("Upload of {} failed: {}", job.request.file_name, err);
                self.state = if current {
                    UploadState::Failed
                } else {
                    UploadState::Idle
                };
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Upload the current selection and wait for the result.
    ///
    /// Returns `Ok(None)` without sending anything if an upload is
    /// already in flight or the selection is already uploaded.
    pub async fn upload(&mut self, selections: &mut SelectionManager) -> AppResult<Option<String>> {
        let Some(job) = self.begin(selections.current())? else {
            return Ok(None);
        };
        let result = self.host.upload(job.request.clone()).await;
        self.finish(job, result, selections)
    }

    /// Return to `Idle`. An in-flight upload keeps the coordinator in
    /// `Uploading` until its response is processed.
    pub fn reset(&mut self) {
        if self.is_uploading() {
            return;
        }
        self.state = UploadState::Idle;
        self.last_error = None;
    }

    fn reject(&mut self, err: UploadError) -> UploadError {
        warn!("Upload not started: {}", err);
        self.last_error = Some(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{to_data_uri, DecodedFile};
    use bytes::Bytes;
    use mockito::Matcher;
    use std::path::PathBuf;

    fn selected(name: &str) -> SelectionManager {
        let mut selections = SelectionManager::new();
        let ticket = selections.begin(vec![PathBuf::from(name)]).unwrap();
        let decoded = DecodedFile {
            name: name.to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 4,
            data_uri: to_data_uri("image/png", b"fake"),
            bytes: Bytes::from_static(b"fake"),
        };
        selections.commit(ticket, Ok(decoded)).unwrap();
        selections
    }

    fn coordinator(api_base: &str) -> UploadCoordinator {
        UploadCoordinator::cloudinary(
            UploadConfig::new("demo", "unsigned").with_api_base(api_base),
            AcceptPolicy::ImagesOnly,
        )
    }

    #[tokio::test]
    async fn test_upload_without_selection_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut selections = SelectionManager::new();
        let mut coordinator = coordinator(&server.url());
        let err = coordinator.upload(&mut selections).await.unwrap_err();

        assert_eq!(err, UploadError::NoFileSelected);
        assert_eq!(coordinator.state(), UploadState::Idle);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_with_missing_config_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut selections = selected("cat.png");
        let config = UploadConfig {
            upload_preset: None,
            ..UploadConfig::new("demo", "unsigned").with_api_base(server.url())
        };
        let mut coordinator = UploadCoordinator::cloudinary(config, AcceptPolicy::ImagesOnly);
        let err = coordinator.upload(&mut selections).await.unwrap_err();

        assert_eq!(err, UploadError::ConfigMissing);
        assert_eq!(coordinator.state(), UploadState::Idle);
        assert_eq!(coordinator.last_error(), Some("Cloudinary configuration missing!"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_successful_upload_sets_remote_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="upload_preset""#.into()),
                Matcher::Regex("unsigned".into()),
                Matcher::Regex(r#"name="file"; filename="cat.png""#.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"secure_url":"https://x/y.png","public_id":"y"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut selections = selected("cat.png");
        let mut coordinator = coordinator(&server.url());
        let url = coordinator.upload(&mut selections).await.unwrap();

        assert_eq!(url.as_deref(), Some("https://x/y.png"));
        assert_eq!(coordinator.state(), UploadState::Succeeded);
        assert_eq!(
            selections.current().unwrap().remote_url.as_deref(),
            Some("https://x/y.png")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_upload_surfaces_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"too large"}}"#)
            .create_async()
            .await;

        let mut selections = selected("cat.png");
        let mut coordinator = coordinator(&server.url());
        let err = coordinator.upload(&mut selections).await.unwrap_err();

        assert_eq!(err, UploadError::ServerRejected("too large".into()));
        assert_eq!(err.to_string(), "too large");
        assert_eq!(coordinator.state(), UploadState::Failed);
        assert!(selections.current().unwrap().remote_url.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_uploading() {
        // Nothing listens on port 9 on the loopback interface.
        let mut selections = selected("cat.png");
        let mut coordinator = coordinator("http://127.0.0.1:9");
        let err = coordinator.upload(&mut selections).await.unwrap_err();

        assert!(matches!(err, UploadError::TransportFailure(_)));
        assert_eq!(coordinator.state(), UploadState::Failed);
        assert!(coordinator.last_error().is_some());
    }

    #[tokio::test]
    async fn test_second_upload_while_uploading_is_noop() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_body(r#"{"secure_url":"https://x/y.png"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut selections = selected("cat.png");
        let mut coordinator = coordinator(&server.url());

        let job = coordinator.begin(selections.current()).unwrap().unwrap();
        assert_eq!(coordinator.state(), UploadState::Uploading);

        // Re-entrant trigger: nothing sent, still uploading.
        assert_eq!(coordinator.upload(&mut selections).await, Ok(None));
        assert_eq!(coordinator.state(), UploadState::Uploading);

        let result = coordinator.host().upload(job.request.clone()).await;
        coordinator.finish(job, result, &mut selections).unwrap();
        assert_eq!(coordinator.state(), UploadState::Succeeded);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_after_success_is_noop() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_body(r#"{"secure_url":"https://x/y.png"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut selections = selected("cat.png");
        let mut coordinator = coordinator(&server.url());
        coordinator.upload(&mut selections).await.unwrap();
        assert_eq!(coordinator.state(), UploadState::Succeeded);

        // Triggering again sends nothing and keeps the URL.
        assert_eq!(coordinator.upload(&mut selections).await, Ok(None));
        assert_eq!(coordinator.state(), UploadState::Succeeded);
        assert_eq!(
            selections.current().unwrap().remote_url.as_deref(),
            Some("https://x/y.png")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_result_for_replaced_selection_is_dropped() {
        let mut selections = selected("first.png");
        let mut coordinator = coordinator("http://unused.invalid");
        let job = coordinator.begin(selections.current()).unwrap().unwrap();

        // User cancels while the request is in flight.
        selections.reset();
        coordinator.reset();
        assert!(coordinator.is_uploading());

        let asset = UploadedAsset {
            secure_url: "https://x/first.png".into(),
            public_id: None,
            bytes: None,
            format: None,
        };
        assert_eq!(coordinator.finish(job, Ok(asset), &mut selections), Ok(None));
        assert_eq!(coordinator.state(), UploadState::Idle);
        assert!(selections.current().is_none());
    }

    #[test]
    fn test_reset_after_failure_returns_to_idle() {
        let mut selections = selected("cat.png");
        let mut coordinator = coordinator("http://unused.invalid");
        let job = coordinator.begin(selections.current()).unwrap().unwrap();
        let _ = coordinator.finish(
            job,
            Err(UploadError::ServerRejected("nope".into())),
            &mut selections,
        );
        assert_eq!(coordinator.state(), UploadState::Failed);

        coordinator.reset();
        assert_eq!(coordinator.state(), UploadState::Idle);
        assert!(coordinator.last_error().is_none());
    }

    #[test]
    fn test_any_policy_uses_auto_resource() {
        let selections = selected("cat.png");
        let mut coordinator = UploadCoordinator::cloudinary(
            UploadConfig::new("demo", "unsigned"),
            AcceptPolicy::Any,
        );
        let job = coordinator.begin(selections.current()).unwrap().unwrap();
        assert_eq!(
            job.request.endpoint,
            "https://api.cloudinary.com/v1_1/demo/auto/upload"
        );
        assert_eq!(job.request.upload_preset, "unsigned");
        assert_eq!(job.selection_version(), selections.current().unwrap().version());
    }
}
