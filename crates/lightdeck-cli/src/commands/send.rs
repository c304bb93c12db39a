//! Send command implementation.

use anyhow::{Context, Result, bail};

use lightdeck_core::DeviceApi;
use lightdeck_types::LightCommand;

use crate::config::Config;

/// Resolve `target` against the configured lights and send one command.
///
/// `target` may be a configured name or ID. Anything else is taken as a raw
/// device ID so lights outside the panel can still be driven.
pub async fn cmd_send<A: DeviceApi>(
    api: &A,
    config: &Config,
    target: &str,
    command: &str,
) -> Result<String> {
    let command: LightCommand = command
        .parse()
        .with_context(|| format!("Invalid command '{}'", command))?;

    let (id, label) = match config.find_light(target) {
        Some(device) if device.id.is_empty() => {
            bail!("Light '{}' has no device id configured", device.name)
        }
        Some(device) => (device.id.as_str(), device.name.as_str()),
        None => (target.trim(), target.trim()),
    };
    if id.is_empty() {
        bail!("No light given");
    }

    tracing::info!(device = id, %command, "Sending command");
    api.send(id, &command)
        .await
        .with_context(|| format!("Failed to send '{}' to {}", command, label))?;

    Ok(format!("{}: {}\n", label, command))
}
