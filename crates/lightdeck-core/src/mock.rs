//! Test doubles for the service and the screen.
//!
//! [`MockDeviceApi`] implements [`DeviceApi`] in memory so the controller can
//! be driven without a network, and [`RecordingDisplay`] implements
//! [`Display`] by logging every call.
//!
//! # Features
//!
//! - **Failure injection**: fail every call, or only the next `n` calls
//! - **Command log**: every command that reaches the "wire" is recorded
//! - **Device simulation**: successful commands update the stored status,
//!   so a later refresh reads back what was sent

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::display::Display;
use crate::error::{Error, Result};
use crate::status::StatusDocument;
use crate::store::DeviceStore;
use crate::traits::DeviceApi;

/// A command received by [`MockDeviceApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub device_id: String,
    pub command: String,
    pub parameter: String,
}

impl SentCommand {
    /// Create a record; handy for assertions.
    pub fn new(device_id: &str, command: &str, parameter: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            command: command.to_string(),
            parameter: parameter.to_string(),
        }
    }
}

/// In-memory stand-in for the device-control service.
///
/// # Example
///
/// ```
/// use lightdeck_core::{DeviceApi, MockDeviceApi};
///
/// #[tokio::main]
/// async fn main() {
///     let api = MockDeviceApi::new().with_light("AAA", false, 40);
///     api.send_command("AAA", "turnOn", "default").await.unwrap();
///
///     let status = api.read_light_status("AAA").await.unwrap();
///     assert!(status.is_on);
///     assert_eq!(api.sent_commands().await.len(), 1);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockDeviceApi {
    statuses: RwLock<HashMap<String, Value>>,
    sent: RwLock<Vec<SentCommand>>,
    status_reads: AtomicU32,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    remaining_failures: AtomicU32,
}

impl MockDeviceApi {
    /// Create a mock with no devices.
    pub fn new() -> Self {
        Self {
            fail_message: RwLock::new("Mock failure".to_string()),
            ..Self::default()
        }
    }

    /// Add a light (builder style).
    pub fn with_light(mut self, device_id: &str, is_on: bool, brightness: i64) -> Self {
        self.statuses
            .get_mut()
            .insert(device_id.to_string(), light_document(is_on, brightness));
        self
    }

    /// Add a sensor (builder style).
    pub fn with_sensor(mut self, device_id: &str, temperature: f64, humidity: i64) -> Self {
        self.statuses
            .get_mut()
            .insert(device_id.to_string(), sensor_document(temperature, humidity));
        self
    }

    // --- Test control methods ---

    /// Replace the status of a light.
    pub async fn set_light(&self, device_id: &str, is_on: bool, brightness: i64) {
        self.set_status(device_id, light_document(is_on, brightness))
            .await;
    }

    /// Replace the status of a sensor.
    pub async fn set_sensor(&self, device_id: &str, temperature: f64, humidity: i64) {
        self.set_status(device_id, sensor_document(temperature, humidity))
            .await;
    }

    /// Replace the raw status document of a device.
    pub async fn set_status(&self, device_id: &str, document: Value) {
        self.statuses
            .write()
            .await
            .insert(device_id.to_string(), document);
    }

    /// Make every call fail (or stop failing).
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Fail the next `count` calls, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Commands received so far, including ones that failed.
    pub async fn sent_commands(&self) -> Vec<SentCommand> {
        self.sent.read().await.clone()
    }

    /// Number of commands received.
    pub async fn command_count(&self) -> usize {
        self.sent.read().await.len()
    }

    /// Number of status reads performed.
    pub fn status_reads(&self) -> u32 {
        self.status_reads.load(Ordering::Relaxed)
    }

    /// Forget recorded commands and reset the read counter.
    pub async fn reset_history(&self) {
        self.sent.write().await.clear();
        self.status_reads.store(0, Ordering::Relaxed);
    }

    async fn check_should_fail(&self) -> Result<()> {
        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Error::command_failed(503, "Mock transient failure"));
        }
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::command_failed(
                500,
                self.fail_message.read().await.clone(),
            ));
        }
        Ok(())
    }

    async fn apply_command(&self, device_id: &str, command: &str, parameter: &str) {
        let mut statuses = self.statuses.write().await;
        let Some(Value::Object(status)) = statuses.get_mut(device_id) else {
            return;
        };
        match command {
            "turnOn" => {
                status.insert("power".to_string(), json!("on"));
            }
            "turnOff" => {
                status.insert("power".to_string(), json!("off"));
            }
            "setBrightness" => {
                if let Ok(value) = parameter.parse::<i64>() {
                    status.insert("brightness".to_string(), json!(value));
                }
            }
            _ => {}
        }
    }
}

fn light_document(is_on: bool, brightness: i64) -> Value {
    json!({
        "power": if is_on { "on" } else { "off" },
        "brightness": brightness,
    })
}

fn sensor_document(temperature: f64, humidity: i64) -> Value {
    json!({
        "temperature": temperature,
        "humidity": humidity,
    })
}

#[async_trait]
impl DeviceApi for MockDeviceApi {
    async fn send_command(&self, device_id: &str, command: &str, parameter: &str) -> Result<()> {
        if device_id.is_empty() {
            return Err(Error::invalid_argument("device id is empty"));
        }
        self.sent
            .write()
            .await
            .push(SentCommand::new(device_id, command, parameter));

        self.check_should_fail().await?;
        self.apply_command(device_id, command, parameter).await;
        Ok(())
    }

    async fn read_status(&self, device_id: &str) -> Result<StatusDocument> {
        if device_id.is_empty() {
            return Err(Error::invalid_argument("device id is empty"));
        }
        self.status_reads.fetch_add(1, Ordering::Relaxed);
        self.check_should_fail().await?;

        self.statuses
            .read()
            .await
            .get(device_id)
            .cloned()
            .map(StatusDocument::from_value)
            .ok_or_else(|| Error::command_failed(404, format!("device {} not found", device_id)))
    }
}

/// A call received by [`RecordingDisplay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOp {
    Header,
    Panel(usize),
    Backlight(u8),
}

/// A [`Display`] that records calls instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    ops: Vec<DisplayOp>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls, oldest first.
    pub fn ops(&self) -> &[DisplayOp] {
        &self.ops
    }

    /// The most recently requested backlight level.
    pub fn backlight(&self) -> Option<u8> {
        self.ops.iter().rev().find_map(|op| match op {
            DisplayOp::Backlight(level) => Some(*level),
            _ => None,
        })
    }

    /// How often panel `index` was drawn.
    pub fn panel_draws(&self, index: usize) -> usize {
        self.ops
            .iter()
            .filter(|op| **op == DisplayOp::Panel(index))
            .count()
    }

    /// How often the header was drawn.
    pub fn header_draws(&self) -> usize {
        self.ops.iter().filter(|op| **op == DisplayOp::Header).count()
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Display for RecordingDisplay {
    fn draw_header(&mut self, _store: &DeviceStore) {
        self.ops.push(DisplayOp::Header);
    }

    fn draw_panel(&mut self, _store: &DeviceStore, index: usize) {
        self.ops.push(DisplayOp::Panel(index));
    }

    fn set_backlight(&mut self, level: u8) {
        self.ops.push(DisplayOp::Backlight(level));
    }
}
