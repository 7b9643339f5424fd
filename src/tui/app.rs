//! Application State
//!
//! Owns the [`DropWidget`] and applies results coming back from the decode
//! and upload tasks it spawns.

use crate::config::Config;
use crate::drop_target::{parse_drop_payload, DragState};
use crate::selection::{decode_file, DecodeTicket, DecodedFile};
use crate::tui::event::AppAction;
use crate::types::{AppResult, Notice};
use crate::upload::{MediaHost, UploadJob, UploadState, UploadedAsset};
use crate::widget::DropWidget;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tui_textarea::TextArea;

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    DropZone,
    Help,
}

/// Results from background tasks
#[derive(Debug)]
pub enum AppEvent {
    Decoded(DecodeTicket, AppResult<DecodedFile>),
    UploadFinished(UploadJob, AppResult<UploadedAsset>),
}

/// A finished upload in this session
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub name: String,
    pub url: String,
    pub finished_at: DateTime<Utc>,
}

/// Main application state
pub struct App {
    // UI State
    pub view: View,
    pub should_quit: bool,
    pub input: TextArea<'static>,
    pub tick: u64,

    pub widget: DropWidget,
    pub history: Vec<UploadRecord>,
    input_generation: u64,

    // Async communication
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(ratatui::style::Style::default());
    input.set_placeholder_text("Drop a file onto the terminal, or type a path and press Enter");
    input
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        let widget = DropWidget::new(&config);
        let (tx, rx) = mpsc::channel(16);

        if !config.upload.is_complete() {
            info!("Upload configuration incomplete; uploads will be refused until it is set");
        }

        Self {
            input_generation: widget.target().generation(),
            view: View::DropZone,
            should_quit: false,
            input: new_input(),
            tick: 0,
            widget,
            history: Vec::new(),
            event_rx: rx,
            event_tx: tx,
        }
    }

    /// Whether quitting right now loses nothing. False while an upload is
    /// in flight.
    pub fn confirm_quit(&self) -> bool {
        self.widget.upload_state() != UploadState::Uploading
    }

    /// Poll for finished decodes and uploads
    pub fn poll_events(&mut self) {
        let mut collected = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            collected.push(event);
        }
        for event in collected {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Decoded(ticket, decoded) => {
                self.widget.complete_decode(ticket, decoded);
            }
            AppEvent::UploadFinished(job, result) => {
                let name = job.request.file_name.clone();
                if let Ok(Some(url)) = self.widget.complete_upload(job, result) {
                    self.history.push(UploadRecord {
                        name,
                        url,
                        finished_at: Utc::now(),
                    });
                }
            }
        }
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        if let AppAction::Tick = action {
            self.tick = self.tick.wrapping_add(1);
            return;
        }

        // A notice blocks everything else until it is acknowledged. Quitting
        // from a notice counts as confirmation.
        if self.widget.notice().is_some() {
            match action {
                AppAction::Quit | AppAction::ForceQuit => self.should_quit = true,
                _ => {
                    self.widget.dismiss_notice();
                }
            }
            return;
        }

        match action {
            AppAction::Quit if !self.confirm_quit() => {
                self.widget.notify(Notice::info(
                    "An upload is still in progress. Press Ctrl+Q again to quit, any other key to stay.",
                ));
            }
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::ToggleHelp => {
                self.view = if self.view == View::Help {
                    View::DropZone
                } else {
                    View::Help
                };
            }
            _ if self.view == View::Help => {
                self.view = View::DropZone;
            }
            AppAction::Escape => self.cancel(),
            AppAction::Drop(paths) => self.drop_files(paths),
            AppAction::Submit => {
                let typed = self.input.lines().join(" ");
                if typed.trim().is_empty() {
                    self.start_upload();
                } else {
                    self.drop_files(parse_drop_payload(&typed));
                }
            }
            AppAction::Upload => self.start_upload(),
            AppAction::Input(key) => {
                self.input.input(key);
                let state = if self.input.is_empty() {
                    DragState::Idle
                } else {
                    DragState::Active
                };
                self.widget.set_drag_state(state);
            }
            AppAction::Tick => {}
        }
    }

    fn drop_files(&mut self, paths: Vec<PathBuf>) {
        let Some(ticket) = self.widget.drop_files(paths) else {
            return;
        };
        self.input = new_input();

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let decoded = decode_file(&ticket.path).await;
            let _ = tx.send(AppEvent::Decoded(ticket, decoded)).await;
        });
    }

    fn start_upload(&mut self) {
        let job = match self.widget.start_upload() {
            Ok(Some(job)) => job,
            Ok(None) => {
                debug!("Upload trigger ignored");
                return;
            }
            Err(_) => return,
        };

        let host = self.widget.host();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = host.upload(job.request.clone()).await;
            let _ = tx.send(AppEvent::UploadFinished(job, result)).await;
        });
    }

    fn cancel(&mut self) {
        self.widget.cancel();
        let generation = self.widget.target().generation();
        if generation != self.input_generation {
            self.input_generation = generation;
            self.input = new_input();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DropConfig, LoggingConfig, UploadConfig};
    use crate::selection::AcceptPolicy;
    use crate::types::NoticeLevel;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn config(api_base: &str) -> Config {
        Config {
            upload: UploadConfig::new("demo", "unsigned").with_api_base(api_base),
            drop: DropConfig {
                accept: AcceptPolicy::ImagesOnly,
            },
            logging: LoggingConfig {
                filter: "oxidized_drop=debug".to_string(),
                log_dir: None,
            },
        }
    }

    async fn settle(app: &mut App) {
        for _ in 0..50 {
            app.poll_events();
            if !app.widget.is_decoding() && !app.widget.target().accepted_files().is_empty() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_drop_then_upload_flow() {
        let dir = tempfile::TempDir::new().unwrap();
        let png = dir.path().join("cat.png");
        std::fs::write(&png, b"png").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_body(r#"{"secure_url":"https://x/cat.png"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut app = App::new(config(&server.url()));
        app.handle_action(AppAction::Drop(vec![png])).await;
        settle(&mut app).await;
        assert_eq!(app.widget.selection().unwrap().name, "cat.png");

        app.handle_action(AppAction::Upload).await;
        assert_eq!(app.widget.upload_state(), UploadState::Uploading);
        // Trigger is inert while uploading.
        app.handle_action(AppAction::Submit).await;

        for _ in 0..100 {
            app.poll_events();
            if app.widget.upload_state() != UploadState::Uploading {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(app.widget.remote_url(), Some("https://x/cat.png"));
        assert_eq!(app.history.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_notice_blocks_until_dismissed() {
        let mut app = App::new(config("http://unused.invalid"));
        app.handle_action(AppAction::Upload).await;
        assert_eq!(app.widget.notice().unwrap().message, "No file selected!");

        // Any key acknowledges the notice and is otherwise swallowed.
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        app.handle_action(AppAction::Input(key)).await;
        assert!(app.widget.notice().is_none());
        assert!(app.input.is_empty());
    }

    #[tokio::test]
    async fn test_quit_during_upload_asks_first() {
        let dir = tempfile::TempDir::new().unwrap();
        let png = dir.path().join("cat.png");
        std::fs::write(&png, b"png").unwrap();

        let mut app = App::new(config("http://unused.invalid"));
        assert!(app.confirm_quit());
        assert!(app.widget.select(vec![png]).await);
        app.handle_action(AppAction::Upload).await;
        assert!(!app.confirm_quit());

        app.handle_action(AppAction::Quit).await;
        assert!(!app.should_quit);
        assert_eq!(app.widget.notice().unwrap().level, NoticeLevel::Info);

        // Any other key keeps the session.
        app.handle_action(AppAction::Escape).await;
        assert!(!app.should_quit);
        assert!(app.widget.notice().is_none());

        app.handle_action(AppAction::Quit).await;
        app.handle_action(AppAction::Quit).await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_typing_marks_drag_active_and_escape_resets() {
        let mut app = App::new(config("http://unused.invalid"));
        let key = KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE);
        app.handle_action(AppAction::Input(key)).await;
        assert_eq!(app.widget.target().drag_state(), DragState::Active);

        app.handle_action(AppAction::Escape).await;
        assert_eq!(app.widget.target().drag_state(), DragState::Idle);
        assert!(app.input.is_empty());
    }
}
