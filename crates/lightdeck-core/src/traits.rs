//! Trait abstraction for the device-control service.
//!
//! This module provides the [`DeviceApi`] trait that abstracts over the real
//! HTTP client and the mock used in tests.

use async_trait::async_trait;

use lightdeck_types::{LightCommand, LightStatus, SensorReading};

use crate::error::Result;
use crate::status::StatusDocument;

/// Trait abstracting the device-control service.
///
/// Only the two raw operations are required; the typed helpers are provided
/// on top of them so every implementation parses status documents the same
/// way.
///
/// # Example
///
/// ```ignore
/// use lightdeck_core::{DeviceApi, Result};
///
/// async fn print_light<A: DeviceApi>(api: &A, id: &str) -> Result<()> {
///     let status = api.read_light_status(id).await?;
///     println!("on={} brightness={}", status.is_on, status.brightness);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Send one command to a device.
    ///
    /// Fails with [`Error::InvalidArgument`](crate::Error::InvalidArgument)
    /// when `device_id` is empty, without touching the network.
    async fn send_command(&self, device_id: &str, command: &str, parameter: &str) -> Result<()>;

    /// Fetch the raw status document of a device.
    async fn read_status(&self, device_id: &str) -> Result<StatusDocument>;

    /// Send a typed light command.
    async fn send(&self, device_id: &str, command: &LightCommand) -> Result<()> {
        self.send_command(device_id, command.name(), &command.parameter())
            .await
    }

    /// Read power and brightness of a light.
    async fn read_light_status(&self, device_id: &str) -> Result<LightStatus> {
        self.read_status(device_id).await?.light_status()
    }

    /// Read temperature and humidity of the sensor.
    async fn read_sensor_status(&self, device_id: &str) -> Result<SensorReading> {
        self.read_status(device_id).await?.sensor_reading()
    }
}
