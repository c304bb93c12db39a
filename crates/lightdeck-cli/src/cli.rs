//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "lightdeck")]
#[command(author, version, about = "Touch panel for SwitchBot lights", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "LIGHTDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file used while the panel owns the terminal
    #[arg(long, global = true, env = "LIGHTDECK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive touch panel (default)
    Run,

    /// Show the current state of every configured device
    Status {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Send one command to a light
    Send {
        /// Light name or device ID
        target: String,

        /// `on`, `off`, or a brightness percentage (1-100)
        command: String,
    },

    /// Write an example configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Config file to use, explicit or default.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::default_config_path)
    }

    /// Whether the terminal panel will own stdout.
    pub fn is_panel(&self) -> bool {
        matches!(self.command, None | Some(Commands::Run))
    }
}
