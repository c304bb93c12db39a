//! Platform-agnostic types for the lightdeck touch panel.
//!
//! This crate provides the device records and command values shared by the
//! core state machine and the command-line front-end.
//!
//! # Features
//!
//! - Clamped [`Brightness`] values (always `1..=100`)
//! - [`Light`] and [`Sensor`] device records
//! - Typed [`LightCommand`]s with their wire names
//! - Error types for text parsing
//!
//! # Example
//!
//! ```
//! use lightdeck_types::{Light, LightCommand};
//!
//! let light = Light::new("94A99076A08A", "Bedroom");
//! assert!(light.is_enabled());
//! assert_eq!(LightCommand::Power(true).name(), "turnOn");
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{Brightness, CommandKind, Light, LightCommand, LightStatus, Sensor, SensorReading};
