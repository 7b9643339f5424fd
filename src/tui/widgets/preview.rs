//! Drop zone / preview panel.

use crate::drop_target::DragState;
use crate::selection::{FileCategory, Selection};
use crate::tui::theme::{Icons, Theme};
use crate::upload::UploadState;
use crate::widget::DropWidget;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

const DATA_URI_PREVIEW_CHARS: usize = 48;
const TEXT_PREVIEW_LINES: usize = 6;

pub fn render_preview(frame: &mut Frame, area: Rect, widget: &DropWidget, tick: u64) {
    match widget.selection() {
        Some(selection) => render_selection(frame, area, widget, selection, tick),
        None => render_empty(frame, area, widget, tick),
    }
}

fn render_empty(frame: &mut Frame, area: Rect, widget: &DropWidget, tick: u64) {
    let target = widget.target();
    let active = target.drag_state() == DragState::Active;
    let (noun, with_article) = if target.accept_pattern() == "image/*" {
        ("image", "an image")
    } else {
        ("file", "a file")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(if active {
            Theme::border_active()
        } else {
            Theme::border()
        });

    let message = if widget.is_decoding() {
        Line::from(Span::styled(
            format!("{} Reading file...", spinner(tick)),
            Theme::active(),
        ))
    } else if active {
        Line::from(Span::styled(
            format!("Drop your {} here...", noun),
            Theme::title(),
        ))
    } else {
        Line::from(Span::styled(
            format!("Drag & drop {} here, or type a path below and press Enter", with_article),
            Theme::text_secondary(),
        ))
    };

    let inner_height = area.height.saturating_sub(2);
    let mut lines = vec![Line::from(""); (inner_height / 2).saturating_sub(1) as usize];
    lines.push(Line::from(Span::styled(Icons::DROP, Theme::title())));
    lines.push(message);
    lines.push(Line::from(Span::styled(
        format!("accepts {} · one file", target.accept_pattern()),
        Theme::text_dim(),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_selection(frame: &mut Frame, area: Rect, widget: &DropWidget, selection: &Selection, tick: u64) {
    let block = Block::default()
        .title(format!(" {} {} ", selection.category.icon(), selection.name))
        .borders(Borders::ALL)
        .border_style(Theme::border_active());

    let mut lines = vec![
        meta_line("Type", &selection.mime_type),
        meta_line("Size", &selection.size_display),
    ];
    if widget.policy().shows_extended_metadata() {
        lines.push(meta_line("Kind", selection.category.label()));
        lines.push(meta_line("Bytes", &selection.size_bytes.to_string()));
    }
    lines.push(Line::from(""));
    lines.extend(content_preview(selection));
    lines.push(Line::from(""));
    lines.push(buttons(widget, tick));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn meta_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<6}", label), Theme::text_dim()),
        Span::styled(value.to_string(), Theme::text()),
    ])
}

/// Text files show their first lines; everything else shows the head of
/// the data URI.
fn content_preview(selection: &Selection) -> Vec<Line<'static>> {
    if selection.category == FileCategory::Text {
        if let Ok(text) = std::str::from_utf8(&selection.bytes) {
            return text
                .lines()
                .take(TEXT_PREVIEW_LINES)
                .map(|l| Line::from(Span::styled(format!("│ {}", l), Theme::text_secondary())))
                .collect();
        }
    }

    let head: String = selection.content.chars().take(DATA_URI_PREVIEW_CHARS).collect();
    vec![Line::from(vec![
        Span::styled(head, Theme::text_secondary()),
        Span::styled(
            format!("… ({} chars)", selection.content.len()),
            Theme::text_dim(),
        ),
    ])]
}

fn buttons(widget: &DropWidget, tick: u64) -> Line<'static> {
    let upload = match widget.upload_state() {
        _ if widget.remote_url().is_some() => Span::styled("Uploaded!", Theme::success()),
        UploadState::Uploading => Span::styled(
            format!(" {} Uploading... ", spinner(tick)),
            Theme::button_disabled(),
        ),
        _ if widget.can_upload() => Span::styled(" Upload [Ctrl+U] ", Theme::button()),
        _ => Span::styled(" Upload [Ctrl+U] ", Theme::button_disabled()),
    };

    Line::from(vec![
        upload,
        Span::raw("   "),
        Span::styled(" Cancel [Esc] ", Theme::button_danger()),
    ])
}

fn spinner(tick: u64) -> &'static str {
    Icons::SPINNER[(tick % Icons::SPINNER.len() as u64) as usize]
}
