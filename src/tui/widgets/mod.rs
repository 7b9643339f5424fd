//! TUI Widgets
//!
//! Custom widgets for the drop zone.

mod preview;
mod progress;

pub use preview::render_preview;
pub use progress::{render_progress, steps, StepState};
