//! Terminal touch panel and command-line client for SwitchBot lights.
//!
//! This crate wraps [`lightdeck_core`] in a `lightdeck` binary. Without a
//! subcommand it runs the interactive panel: one column per light with a
//! power button and a brightness slider, driven with the mouse.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Interactive touch panel (default) |
//! | `status` | Print the state of every configured device |
//! | `send` | Send `on`, `off` or a brightness to one light |
//! | `init` | Write an example configuration file |
//!
//! # Configuration
//!
//! Settings live in `~/.config/lightdeck/config.toml` (or platform
//! equivalent); see [`config`] for the format.
//!
//! # Environment Variables
//!
//! - `LIGHTDECK_CONFIG`: Config file path (overridden by `--config`)
//! - `LIGHTDECK_TOKEN`, `LIGHTDECK_SECRET`: API credentials
//! - `LIGHTDECK_LOG_FILE`: Panel log file (overridden by `--log-file`)
//! - `RUST_LOG`: Log filter when neither `--verbose` nor `--quiet` is given
//!
//! # Examples
//!
//! ```bash
//! lightdeck init
//! lightdeck status --format json
//! lightdeck send Bedroom 40
//! lightdeck
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod panel;
