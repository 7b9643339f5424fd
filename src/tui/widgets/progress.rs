//! Progress Widget
//!
//! One-line view of where the drop zone is: Select → Upload → Done.

use crate::tui::theme::{Icons, Theme};
use crate::upload::UploadState;
use crate::widget::DropWidget;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Active,
    Complete,
    Error,
}

/// State of the three steps for the given widget.
pub fn steps(widget: &DropWidget) -> [(&'static str, StepState); 3] {
    let has_selection = widget.selection().is_some();
    let select = if has_selection {
        StepState::Complete
    } else if widget.is_decoding() {
        StepState::Active
    } else {
        StepState::Pending
    };

    let (upload, done) = match widget.upload_state() {
        UploadState::Uploading => (StepState::Active, StepState::Pending),
        UploadState::Succeeded if widget.remote_url().is_some() => {
            (StepState::Complete, StepState::Complete)
        }
        UploadState::Failed => (StepState::Error, StepState::Pending),
        _ => (StepState::Pending, StepState::Pending),
    };

    [("Select", select), ("Upload", upload), ("Done", done)]
}

/// Render the progress indicator
pub fn render_progress(frame: &mut Frame, area: Rect, widget: &DropWidget) {
    let block = Block::default()
        .title(" Progress ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = Vec::new();
    for (i, (name, state)) in steps(widget).iter().enumerate() {
        let (icon, style) = match state {
            StepState::Complete => (Icons::COMPLETE, Theme::complete()),
            StepState::Active => (Icons::ACTIVE, Theme::active()),
            StepState::Pending => (Icons::PENDING, Theme::pending()),
            StepState::Error => (Icons::ERROR, Theme::error()),
        };
        if i > 0 {
            spans.push(Span::styled(format!(" {} ", Icons::ARROW), Theme::text_dim()));
        }
        spans.push(Span::styled(format!("{} {}", icon, name), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}
