// Logger initialization
//
// The TUI owns the terminal, so in that mode log lines go to a daily file
// instead of stderr.

use crate::config::LoggingConfig;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub enum LogTarget {
    Stderr,
    File,
}

/// Directory for log files: `DROP_LOG_DIR`, else the platform data dir.
pub fn log_dir(config: &LoggingConfig) -> PathBuf {
    config
        .log_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("oxidized-drop")
                .join("logs")
        })
}

/// Install the global subscriber. Keep the returned guard alive for the
/// life of the process so buffered file output is flushed.
pub fn init_logger(config: &LoggingConfig, target: LogTarget) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.filter)
        .unwrap_or_else(|_| "oxidized_drop=info".into());

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
            Ok(None)
        }
        LogTarget::File => {
            let dir = log_dir(config);
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(dir, "oxidized-drop.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
    }
}
