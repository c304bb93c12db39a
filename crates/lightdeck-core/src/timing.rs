//! Interaction timing constants.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backlight level while the screen is awake.
pub const BACKLIGHT_AWAKE: u8 = 255;

/// Backlight level while the screen is dimmed.
pub const BACKLIGHT_DIMMED: u8 = 0;

/// Tunable timings for the touch panel.
///
/// Durations are in milliseconds, distances in canvas pixels. Every field
/// is optional when deserialized; missing fields keep their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Minimum gap between two outbound commands.
    pub debounce_ms: u64,
    /// Horizontal travel that turns a slider touch into a drag.
    pub drag_threshold_px: u32,
    /// Hold time that toggles a power button.
    pub long_press_ms: u64,
    /// Inactivity before the backlight dims.
    pub idle_timeout_ms: u64,
    /// Touch input ignored for this long after waking.
    pub wake_ignore_ms: u64,
    /// Quiet time after the last command before state is re-read.
    pub reconcile_quiet_ms: u64,
    /// Delay between switching a light off on screen and sending `turnOff`.
    pub delayed_off_ms: u64,
    /// Sensor polling interval.
    pub sensor_refresh_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            drag_threshold_px: 20,
            long_press_ms: 500,
            idle_timeout_ms: 30_000,
            wake_ignore_ms: 300,
            reconcile_quiet_ms: 10_000,
            delayed_off_ms: 5_000,
            sensor_refresh_ms: 60_000,
        }
    }
}

impl Timings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn drag_threshold(&self) -> i32 {
        i32::try_from(self.drag_threshold_px).unwrap_or(i32::MAX)
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn wake_ignore(&self) -> Duration {
        Duration::from_millis(self.wake_ignore_ms)
    }

    pub fn reconcile_quiet(&self) -> Duration {
        Duration::from_millis(self.reconcile_quiet_ms)
    }

    pub fn delayed_off(&self) -> Duration {
        Duration::from_millis(self.delayed_off_ms)
    }

    pub fn sensor_refresh(&self) -> Duration {
        Duration::from_millis(self.sensor_refresh_ms)
    }

    /// Names of fields that are zero.
    pub fn zero_fields(&self) -> Vec<&'static str> {
        [
            ("debounce_ms", self.debounce_ms),
            ("drag_threshold_px", u64::from(self.drag_threshold_px)),
            ("long_press_ms", self.long_press_ms),
            ("idle_timeout_ms", self.idle_timeout_ms),
            ("wake_ignore_ms", self.wake_ignore_ms),
            ("reconcile_quiet_ms", self.reconcile_quiet_ms),
            ("delayed_off_ms", self.delayed_off_ms),
            ("sensor_refresh_ms", self.sensor_refresh_ms),
        ]
        .into_iter()
        .filter(|(_, value)| *value == 0)
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Timings::default();
        assert_eq!(t.debounce(), Duration::from_millis(500));
        assert_eq!(t.drag_threshold(), 20);
        assert_eq!(t.long_press(), Duration::from_millis(500));
        assert_eq!(t.idle_timeout(), Duration::from_secs(30));
        assert_eq!(t.wake_ignore(), Duration::from_millis(300));
        assert_eq!(t.reconcile_quiet(), Duration::from_secs(10));
        assert_eq!(t.delayed_off(), Duration::from_secs(5));
        assert_eq!(t.sensor_refresh(), Duration::from_secs(60));
        assert!(t.zero_fields().is_empty());
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let t: Timings = serde_json::from_str(r#"{"debounce_ms":250,"idle_timeout_ms":0}"#).unwrap();
        assert_eq!(t.debounce_ms, 250);
        assert_eq!(t.long_press_ms, 500);
        assert_eq!(t.zero_fields(), vec!["idle_timeout_ms"]);
    }

    #[test]
    fn test_drag_threshold_saturates() {
        let t = Timings {
            drag_threshold_px: u32::MAX,
            ..Timings::default()
        };
        assert_eq!(t.drag_threshold(), i32::MAX);
    }
}
