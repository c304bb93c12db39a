//! Status command implementation.

use anyhow::Result;
use serde::Serialize;

use lightdeck_core::DeviceApi;
use lightdeck_types::{LightStatus, SensorReading};

use crate::cli::OutputFormat;
use crate::config::Config;

/// State of one configured device, or why it could not be read.
#[derive(Debug, Serialize)]
struct DeviceRow<T> {
    name: String,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    lights: Vec<DeviceRow<LightStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensor: Option<DeviceRow<SensorReading>>,
}

/// Read every configured device and format the result.
///
/// Unconfigured panels are listed without being queried. Failed reads are
/// reported per device instead of aborting the whole command.
pub async fn cmd_status<A: DeviceApi>(
    api: &A,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let mut lights = Vec::with_capacity(config.lights.len());
    for device in &config.lights {
        let (state, error) = if device.id.is_empty() {
            (None, None)
        } else {
            match api.read_light_status(&device.id).await {
                Ok(status) => (Some(status), None),
                Err(e) => (None, Some(e.to_string())),
            }
        };
        lights.push(DeviceRow {
            name: device.name.clone(),
            id: device.id.clone(),
            state,
            error,
        });
    }

    let mut sensor = None;
    if let Some(device) = config.sensor.as_ref().filter(|d| !d.id.is_empty()) {
        let (state, error) = match api.read_sensor_status(&device.id).await {
            Ok(reading) => (Some(reading), None),
            Err(e) => (None, Some(e.to_string())),
        };
        sensor = Some(DeviceRow {
            name: device.name.clone(),
            id: device.id.clone(),
            state,
            error,
        });
    }

    let report = StatusReport { lights, sensor };
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)? + "\n"),
        OutputFormat::Text => Ok(format_status_text(&report)),
    }
}

fn format_status_text(report: &StatusReport) -> String {
    let width = report
        .lights
        .iter()
        .map(|row| row.name.len())
        .chain(report.sensor.iter().map(|row| row.name.len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for row in &report.lights {
        let value = match (&row.state, &row.error) {
            (Some(status), _) => format!(
                "{:<3} {}",
                if status.is_on { "on" } else { "off" },
                status.brightness
            ),
            (None, Some(err)) => format!("error: {}", err),
            (None, None) => "not configured".to_string(),
        };
        out.push_str(&format!("{:<width$}  {}\n", row.name, value));
    }
    if let Some(row) = &report.sensor {
        let value = match (&row.state, &row.error) {
            (Some(reading), _) => reading.to_string(),
            (None, Some(err)) => format!("error: {}", err),
            (None, None) => String::new(),
        };
        out.push_str(&format!("{:<width$}  {}\n", row.name, value));
    }
    out
}
