use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lightdeck_cli::cli::{Cli, Commands};
use lightdeck_cli::commands::{cmd_init, cmd_send, cmd_status};
use lightdeck_cli::config::{Config, default_log_path};
use lightdeck_cli::panel;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config_path = cli.config_path();
    tracing::debug!("Using config {}", config_path.display());

    match cli.command {
        Some(Commands::Init { force }) => print(&cmd_init(&config_path, force)?),
        Some(Commands::Status { format }) => {
            let config = Config::load_validated(&config_path)?;
            let client = config.client()?;
            print(&cmd_status(&client, &config, format).await?)
        }
        Some(Commands::Send { target, command }) => {
            let config = Config::load_validated(&config_path)?;
            let client = config.client()?;
            let out = cmd_send(&client, &config, &target, &command).await?;
            if cli.quiet { Ok(()) } else { print(&out) }
        }
        Some(Commands::Run) | None => {
            let config = Config::load_validated(&config_path)?;
            panel::run(&config).await
        }
    }
}

/// Initialize tracing.
///
/// The panel owns the terminal, so its logs go to a file; other commands
/// log to stderr.
fn init_tracing(cli: &Cli) -> Result<()> {
    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if cli.is_panel() {
        let path = cli.log_file.clone().unwrap_or_else(default_log_path);
        let file = open_log(&path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

fn print(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
