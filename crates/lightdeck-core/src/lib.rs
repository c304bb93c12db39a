//! Touch interaction engine and signed service client for lightdeck.
//!
//! This crate turns raw touch samples into debounced, authenticated commands
//! for a small set of networked lights, and keeps an in-memory picture of
//! their state for rendering.
//!
//! # Features
//!
//! - **Signed requests**: HMAC-SHA256 over token, timestamp and nonce
//! - **Status extraction**: power, brightness, temperature and humidity from
//!   the service's JSON documents
//! - **Gesture recognition**: tap vs. long press vs. slider drag
//! - **Rate limiting**: one outbound command per debounce window, later
//!   commands queued and coalesced
//! - **Delayed power-off**: switching off can be undone before it is sent
//! - **Screen power**: backlight dimming after inactivity, wake on touch
//!
//! # Architecture
//!
//! | Module | Role |
//! |--------|------|
//! | [`signing`], [`client`], [`status`] | Signed HTTP client ([`SwitchBotClient`]) |
//! | [`store`] | Device records ([`DeviceStore`]) |
//! | [`layout`], [`gesture`] | Geometry and gesture recognition |
//! | [`dispatch`], [`interaction`], [`timing`] | The state machine ([`Controller`]) |
//! | [`display`] | Render boundary ([`Display`]) |
//! | [`mock`] | Test doubles |
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Instant;
//!
//! use lightdeck_core::{Controller, Credentials, DeviceStore, RecordingDisplay, SwitchBotClient, Timings};
//! use lightdeck_types::{Light, Sensor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SwitchBotClient::new(
//!         lightdeck_core::client::DEFAULT_BASE_URL,
//!         Credentials::new("api-token", "signing-secret"),
//!     )?;
//!     let store = DeviceStore::new(vec![Light::new("94A99076A08A", "Bedroom")], Sensor::new("", ""));
//!
//!     let mut panel = Controller::new(client, RecordingDisplay::new(), store, Timings::default());
//!     panel.start(Instant::now()).await;
//!     loop {
//!         panel.tick(Instant::now(), None).await;
//!         tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//!     }
//! }
//! ```

pub mod client;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod gesture;
pub mod interaction;
pub mod layout;
pub mod mock;
pub mod signing;
pub mod status;
pub mod store;
pub mod timing;
pub mod traits;

// Core exports
pub use client::SwitchBotClient;
pub use dispatch::{DispatchGate, PendingCommand};
pub use display::Display;
pub use error::{Error, Result};
pub use gesture::{Gesture, GestureInterpreter, PointerEvent, PointerTracker, TouchPhase, TouchState};
pub use interaction::{Controller, InteractionContext, ScreenPower};
pub use layout::{Layout, Point, Rect, Region};
pub use mock::{DisplayOp, MockDeviceApi, RecordingDisplay, SentCommand};
pub use signing::{Credentials, SignedHeaders};
pub use status::StatusDocument;
pub use store::DeviceStore;
pub use timing::Timings;
pub use traits::DeviceApi;

// Re-export types
pub use lightdeck_types::{Brightness, CommandKind, Light, LightCommand, LightStatus, Sensor, SensorReading};
