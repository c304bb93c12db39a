//! Core types for lights, sensors and the commands sent to them.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Brightness level of a dimmable light.
///
/// The value is always within `1..=100`. Every constructor clamps, so a
/// `Brightness` can never represent "off"; power is a separate flag.
///
/// ```
/// use lightdeck_types::Brightness;
///
/// assert_eq!(Brightness::new(42).get(), 42);
/// assert_eq!(Brightness::new(0).get(), 1);
/// assert_eq!(Brightness::new(250).get(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "i64", into = "u8"))]
pub struct Brightness(u8);

impl Brightness {
    /// Lowest brightness a light can be commanded to.
    pub const MIN: Brightness = Brightness(1);
    /// Highest brightness.
    pub const MAX: Brightness = Brightness(100);

    /// Create a brightness, clamping `value` into `1..=100`.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    /// The brightness as a percentage.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<i64> for Brightness {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Brightness> for u8 {
    fn from(value: Brightness) -> Self {
        value.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Power and brightness reported by (or applied to) a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightStatus {
    /// Whether the light is switched on.
    pub is_on: bool,
    /// Brightness level.
    pub brightness: Brightness,
}

/// Temperature and humidity reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Relative humidity percentage (0-100).
    pub humidity: u8,
}

impl SensorReading {
    /// Create a reading, clamping humidity into `0..=100`.
    #[must_use]
    pub fn new(temperature_c: f32, humidity: i64) -> Self {
        Self {
            temperature_c,
            humidity: humidity.clamp(0, 100) as u8,
        }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}C  {}%", self.temperature_c, self.humidity)
    }
}

/// A dimmable light shown as one panel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Light {
    /// Cloud device ID. Empty means the slot is not configured.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Local (possibly optimistic) power state.
    pub is_on: bool,
    /// Local (possibly optimistic) brightness.
    pub brightness: Brightness,
}

impl Light {
    /// Create a light that starts switched off at full brightness.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_on: false,
            brightness: Brightness::MAX,
        }
    }

    /// Whether the light has a device ID and can be touched and commanded.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.id.is_empty()
    }

    /// Current state as a [`LightStatus`].
    #[must_use]
    pub fn status(&self) -> LightStatus {
        LightStatus {
            is_on: self.is_on,
            brightness: self.brightness,
        }
    }
}

/// The temperature/humidity sensor shown in the header.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sensor {
    /// Cloud device ID. Empty means no sensor is configured.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Last successful reading; `None` until the first poll succeeds.
    pub reading: Option<SensorReading>,
}

impl Sensor {
    /// Create a sensor with no reading yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            reading: None,
        }
    }

    /// Whether the sensor has a device ID and should be polled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.id.is_empty()
    }

    /// Whether a reading has been received.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.reading.is_some()
    }
}

/// Which setting a [`LightCommand`] changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `turnOn` / `turnOff`.
    Power,
    /// `setBrightness`.
    Brightness,
}

/// A command that can be sent to a light.
///
/// ```
/// use lightdeck_types::{Brightness, LightCommand};
///
/// let cmd: LightCommand = "42".parse().unwrap();
/// assert_eq!(cmd, LightCommand::Brightness(Brightness::new(42)));
/// assert_eq!(cmd.name(), "setBrightness");
/// assert_eq!(cmd.parameter(), "42");
///
/// assert_eq!(LightCommand::Power(false).name(), "turnOff");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    /// Switch the light on (`true`) or off (`false`).
    Power(bool),
    /// Set the brightness.
    Brightness(Brightness),
}

impl LightCommand {
    /// Command name on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LightCommand::Power(true) => "turnOn",
            LightCommand::Power(false) => "turnOff",
            LightCommand::Brightness(_) => "setBrightness",
        }
    }

    /// Command parameter on the wire.
    #[must_use]
    pub fn parameter(&self) -> String {
        match self {
            LightCommand::Power(_) => "default".to_string(),
            LightCommand::Brightness(b) => b.get().to_string(),
        }
    }

    /// The setting this command changes.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            LightCommand::Power(_) => CommandKind::Power,
            LightCommand::Brightness(_) => CommandKind::Brightness,
        }
    }
}

impl fmt::Display for LightCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightCommand::Power(true) => write!(f, "on"),
            LightCommand::Power(false) => write!(f, "off"),
            LightCommand::Brightness(b) => write!(f, "brightness {}", b),
        }
    }
}

impl FromStr for LightCommand {
    type Err = ParseError;

    /// Parse `on`, `off`, or a brightness percentage `1`-`100`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "on" => return Ok(LightCommand::Power(true)),
            "off" => return Ok(LightCommand::Power(false)),
            _ => {}
        }

        let value: i64 = s
            .trim_end_matches('%')
            .parse()
            .map_err(|_| ParseError::UnknownCommand(s.to_string()))?;
        if !(1..=100).contains(&value) {
            return Err(ParseError::InvalidValue(format!(
                "brightness {} is outside 1-100",
                value
            )));
        }
        Ok(LightCommand::Brightness(Brightness::new(value)))
    }
}
