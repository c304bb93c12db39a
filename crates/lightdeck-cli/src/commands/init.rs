//! Init command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::Config;

/// Write an example configuration to `path`.
pub fn cmd_init(path: &Path, force: bool) -> Result<String> {
    if path.exists() && !force {
        bail!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::example()
        .save(path)
        .context("Failed to write example config")?;

    Ok(format!(
        "Wrote {}\nFill in api.token, api.secret and the device ids, then run `lightdeck`.\n",
        path.display()
    ))
}
