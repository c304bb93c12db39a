//! In-memory device state.
//!
//! [`DeviceStore`] owns the record of every configured light and the one
//! ambient sensor. It is the single source of truth for rendering and for
//! command parameters; the controller refers to lights only by index.

use lightdeck_types::{Brightness, Light, LightStatus, Sensor, SensorReading};

/// Records for the configured lights and the sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStore {
    lights: Vec<Light>,
    sensor: Sensor,
}

impl DeviceStore {
    /// Create a store from the configured devices.
    pub fn new(lights: Vec<Light>, sensor: Sensor) -> Self {
        Self { lights, sensor }
    }

    /// Get a light by index.
    pub fn get(&self, index: usize) -> Option<&Light> {
        self.lights.get(index)
    }

    /// All lights, in panel order.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Number of light panels.
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no lights are configured.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// The ambient sensor.
    pub fn sensor(&self) -> &Sensor {
        &self.sensor
    }

    /// Whether the light at `index` exists and has a device ID.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.get(index).is_some_and(Light::is_enabled)
    }

    /// Indices of lights with a device ID.
    pub fn enabled_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.lights
            .iter()
            .enumerate()
            .filter(|(_, light)| light.is_enabled())
            .map(|(i, _)| i)
    }

    /// Overwrite power and brightness of a light.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn set_light_state(&mut self, index: usize, is_on: bool, brightness: i64) -> bool {
        self.apply_status(
            index,
            LightStatus {
                is_on,
                brightness: Brightness::new(brightness),
            },
        )
    }

    /// Overwrite a light with a status read from the service.
    pub fn apply_status(&mut self, index: usize, status: LightStatus) -> bool {
        match self.lights.get_mut(index) {
            Some(light) => {
                light.is_on = status.is_on;
                light.brightness = status.brightness;
                true
            }
            None => false,
        }
    }

    /// Set the brightness of a light, clamped into `1..=100`.
    pub fn set_brightness(&mut self, index: usize, brightness: i64) -> bool {
        match self.lights.get_mut(index) {
            Some(light) => {
                light.brightness = Brightness::new(brightness);
                true
            }
            None => false,
        }
    }

    /// Set the power state of a light.
    pub fn set_power(&mut self, index: usize, is_on: bool) -> bool {
        match self.lights.get_mut(index) {
            Some(light) => {
                light.is_on = is_on;
                true
            }
            None => false,
        }
    }

    /// Store a new sensor reading; humidity is clamped into `0..=100`.
    pub fn set_sensor_reading(&mut self, temperature_c: f32, humidity: i64) {
        self.sensor.reading = Some(SensorReading::new(temperature_c, humidity));
    }

    /// Store a sensor reading read from the service.
    pub fn apply_sensor_reading(&mut self, reading: SensorReading) {
        self.sensor.reading = Some(reading);
    }
}
