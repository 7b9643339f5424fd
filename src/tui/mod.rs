//! Terminal User Interface Module
//!
//! A drop zone in the terminal. Dragging a file onto the window pastes its
//! path, which the event handler turns into a drop.
//!
//! ```text
//! ┌──────────────── Oxidized Drop  media upload  ● demo ────────────────┐
//! ├─ Progress ──────────────────────────────────────────────────────────┤
//! │ ✓ Select → ● Upload → ○ Done                                        │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                    Drag & drop an image here                        │
//! │            [preview + metadata once a file is selected]             │
//! ├─ Public URL ────────────────────────────────────────────────────────┤
//! ├─ Path ──────────────────────────────────────────────────────────────┤
//! │ Ready │ [Enter] Select/Upload [Esc] Cancel [Ctrl+Q] Quit [F1] Help  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, View};
pub use event::{AppAction, EventHandler};

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: crate::config::Config) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    let mut terminal = init_terminal()?;
    let mut app = App::new(config);
    let mut events = EventHandler::new(std::time::Duration::from_millis(120));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Apply finished decodes and uploads
        app.poll_events();

        if let Some(action) = events.next().await {
            match action {
                AppAction::Quit if app.confirm_quit() => break,
                AppAction::ForceQuit => break,
                _ => app.handle_action(action).await,
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
