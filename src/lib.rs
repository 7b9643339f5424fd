// Oxidized Drop - drop a file, preview it, upload it to a media host

pub mod config;
pub mod types;
pub mod selection;   // Selection/preview state and file decoding
pub mod drop_target;
pub mod upload;      // Upload coordinator and media host clients
pub mod widget;
pub mod tui;         // Terminal User Interface
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use types::{AppResult, Notice, UploadError};
pub use widget::DropWidget;
