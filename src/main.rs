use clap::{Parser, Subcommand};
use oxidized_drop::{
    config::{parse_accept, Config},
    utils::{init_logger, LogTarget},
    DropWidget,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "oxidized-drop", version, about = "Drop a file, preview it, upload it")]
struct Cli {
    /// Accepted file types: `image` or `any` (overrides DROP_ACCEPT)
    #[arg(long, global = true)]
    accept: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive drop zone (default)
    Tui,
    /// Upload one file and print its public URL
    Upload {
        /// File to upload
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(accept) = cli.accept.as_deref() {
        config.drop.accept = parse_accept(accept)?;
    }

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let _guard = init_logger(&config.logging, LogTarget::File)?;
            info!("Accepting {}", config.drop.accept.pattern());
            oxidized_drop::tui::run(config).await
        }
        Command::Upload { path } => {
            init_logger(&config.logging, LogTarget::Stderr)?;
            upload_once(&config, path).await
        }
    }
}

async fn upload_once(config: &Config, path: PathBuf) -> anyhow::Result<()> {
    let mut widget = DropWidget::new(config);

    if !widget.select(vec![path]).await {
        let reason = widget
            .dismiss_notice()
            .map(|n| n.message)
            .unwrap_or_else(|| "No file selected!".to_string());
        anyhow::bail!(reason);
    }

    if let Some(selection) = widget.selection() {
        eprintln!(
            "{} {}  {}  {}",
            selection.category.icon(),
            selection.name,
            selection.mime_type,
            selection.size_display
        );
    }

    match widget.upload().await {
        Ok(Some(url)) => {
            println!("{}", url);
            Ok(())
        }
        Ok(None) => anyhow::bail!("Upload did not complete"),
        Err(err) => Err(anyhow::anyhow!(err)),
    }
}
