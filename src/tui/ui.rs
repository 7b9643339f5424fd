//! UI Rendering
//!
//! Main UI layout and rendering logic for the TUI.

use crate::tui::app::{App, View};
use crate::tui::theme::Theme;
use crate::tui::widgets;
use crate::types::NoticeLevel;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(3),  // Progress
            Constraint::Min(10),    // Drop zone / preview
            Constraint::Length(3),  // Uploaded URL
            Constraint::Length(3),  // Path input
            Constraint::Length(1),  // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    widgets::render_progress(frame, chunks[1], &app.widget);
    widgets::render_preview(frame, chunks[2], &app.widget, app.tick);
    render_url(frame, chunks[3], app);
    render_input(frame, chunks[4], app);
    render_status_bar(frame, chunks[5], app);

    if app.view == View::Help {
        render_help(frame);
    }
    // The notice sits above everything, including help.
    if app.widget.notice().is_some() {
        render_notice(frame, app);
    }
}

/// Header with a dot showing whether upload configuration is present
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let config = app.widget.upload_config();
    let (dot, destination) = match config.credentials() {
        Some((cloud, _)) => (Span::styled("●", Style::default().fg(Color::Green)), cloud.to_string()),
        None => (
            Span::styled("●", Style::default().fg(Color::Red)),
            "not configured".to_string(),
        ),
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled("Oxidized Drop", Theme::title()),
        Span::styled("  media upload  ", Theme::text_secondary()),
        dot,
        Span::raw(" "),
        Span::styled(destination, Theme::text_dim()),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(title, area);
}

fn render_url(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Public URL ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let line = match app.widget.remote_url() {
        Some(url) => Line::from(Span::styled(url.to_string(), Theme::link())),
        None => match app.history.last() {
            Some(last) => Line::from(Span::styled(
                format!(
                    "last: {} ({}) at {}",
                    last.url,
                    last.name,
                    last.finished_at.format("%H:%M:%S")
                ),
                Theme::text_dim(),
            )),
            None => Line::from(Span::styled("Nothing uploaded yet", Theme::text_dim())),
        },
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the path input
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Path ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = if app.widget.is_decoding() {
        Span::styled("Reading file...", Theme::active())
    } else if app.widget.selection().is_some() {
        Span::styled("File selected", Theme::text_secondary())
    } else {
        Span::styled("Ready", Theme::text_secondary())
    };

    let shortcuts = vec![
        Span::styled(" [Enter]", Theme::shortcut_key()),
        Span::styled(" Select/Upload ", Theme::shortcut_desc()),
        Span::styled("[Esc]", Theme::shortcut_key()),
        Span::styled(" Cancel ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+Q]", Theme::shortcut_key()),
        Span::styled(" Quit ", Theme::shortcut_desc()),
        Span::styled("[F1]", Theme::shortcut_key()),
        Span::styled(" Help", Theme::shortcut_desc()),
    ];

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

fn render_notice(frame: &mut Frame, app: &App) {
    let Some(notice) = app.widget.notice() else {
        return;
    };
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);

    let (title, border) = match notice.level {
        NoticeLevel::Error => (" Error ", Theme::error()),
        NoticeLevel::Info => (" Notice ", Theme::border_active()),
    };

    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(notice.message.clone(), Theme::text())),
        Line::from(""),
        Line::from(Span::styled("Press any key to continue", Theme::text_dim())),
    ])
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border),
    );

    frame.render_widget(paragraph, area);
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Drag a file  ", Theme::shortcut_key()),
            Span::styled("Select it (drop onto the terminal)", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Enter        ", Theme::shortcut_key()),
            Span::styled("Select typed path, or upload", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+U       ", Theme::shortcut_key()),
            Span::styled("Upload", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Esc          ", Theme::shortcut_key()),
            Span::styled("Cancel selection / close modal", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+Q       ", Theme::shortcut_key()),
            Span::styled("Quit application", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+C       ", Theme::shortcut_key()),
            Span::styled("Force quit", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("F1 / Ctrl+H  ", Theme::shortcut_key()),
            Span::styled("Show this help", Theme::text()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_active()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
