//! Configuration file management.
//!
//! The panel reads a TOML file (by default `~/.config/lightdeck/config.toml`
//! or the platform equivalent):
//!
//! ```toml
//! [api]
//! base_url = "https://api.switch-bot.com/v1.1"
//! token = "..."
//! secret = "..."
//! timeout_secs = 10
//!
//! [[lights]]
//! id = "94A99076A08A"
//! name = "Bedroom"
//!
//! [sensor]
//! id = "CA323435166C"
//! name = "Meter"
//!
//! [timings]
//! debounce_ms = 500
//! ```
//!
//! The token and secret may instead come from `LIGHTDECK_TOKEN` and
//! `LIGHTDECK_SECRET`, which take precedence over the file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lightdeck_core::client::DEFAULT_BASE_URL;
use lightdeck_core::{Credentials, DeviceStore, SwitchBotClient, Timings};
use lightdeck_types::{Light, Sensor};

/// Environment variable overriding `api.token`.
pub const TOKEN_ENV: &str = "LIGHTDECK_TOKEN";
/// Environment variable overriding `api.secret`.
pub const SECRET_ENV: &str = "LIGHTDECK_SECRET";

/// Most panels that fit side by side on the canvas.
pub const MAX_LIGHTS: usize = 8;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service endpoint and credentials.
    pub api: ApiConfig,
    /// Lights, one panel each, in screen order.
    pub lights: Vec<DeviceConfig>,
    /// Temperature/humidity sensor shown in the header.
    pub sensor: Option<DeviceConfig>,
    /// Interaction timings.
    pub timings: Timings,
}

/// Service endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root.
    pub base_url: String,
    /// API token (sent as `Authorization`).
    pub token: String,
    /// HMAC signing secret.
    pub secret: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            secret: String::new(),
            timeout_secs: 10,
        }
    }
}

/// One configured device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Cloud device ID. Leave empty to show an inert placeholder panel.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl DeviceConfig {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Load a file, apply environment overrides and validate.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override credentials from the environment.
    ///
    /// `lookup` is usually `std::env::var`; empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.api.token = token;
        }
        if let Some(secret) = lookup(SECRET_ENV).filter(|v| !v.is_empty()) {
            self.api.secret = secret;
        }
    }

    /// Validate the configuration and return all problems at once.
    ///
    /// This checks:
    /// - The base URL uses http or https
    /// - Token and secret are set
    /// - Between 1 and 8 lights are configured
    /// - No two devices share an ID
    /// - The request timeout is between 1 and 120 seconds
    /// - No timing is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.api.validate());

        if self.lights.is_empty() {
            errors.push(ValidationError::new("lights", "at least one light is required"));
        } else if self.lights.len() > MAX_LIGHTS {
            errors.push(ValidationError::new(
                "lights",
                format!("at most {} lights fit on screen, got {}", MAX_LIGHTS, self.lights.len()),
            ));
        }

        let mut seen = HashSet::new();
        let devices = self
            .lights
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("lights[{}].id", i), d))
            .chain(self.sensor.iter().map(|d| ("sensor.id".to_string(), d)));
        for (field, device) in devices {
            if !device.id.is_empty() && !seen.insert(device.id.as_str()) {
                errors.push(ValidationError::new(
                    field,
                    format!("duplicate device id '{}'", device.id),
                ));
            }
        }

        for name in self.timings.zero_fields() {
            errors.push(ValidationError::new(
                format!("timings.{}", name),
                "must be greater than 0",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Device records for the configured lights and sensor.
    pub fn device_store(&self) -> DeviceStore {
        let lights = self
            .lights
            .iter()
            .map(|d| Light::new(d.id.as_str(), d.name.as_str()))
            .collect();
        let sensor = self
            .sensor
            .as_ref()
            .map(|d| Sensor::new(d.id.as_str(), d.name.as_str()))
            .unwrap_or_else(|| Sensor::new("", ""));
        DeviceStore::new(lights, sensor)
    }

    /// Build the signed HTTP client.
    pub fn client(&self) -> lightdeck_core::Result<SwitchBotClient> {
        SwitchBotClient::with_timeout(
            &self.api.base_url,
            Credentials::new(self.api.token.as_str(), self.api.secret.as_str()),
            Duration::from_secs(self.api.timeout_secs),
        )
    }

    /// Look up a light by device ID or (case-insensitive) name.
    pub fn find_light(&self, target: &str) -> Option<&DeviceConfig> {
        self.lights
            .iter()
            .find(|d| !d.id.is_empty() && d.id == target)
            .or_else(|| {
                self.lights
                    .iter()
                    .find(|d| d.name.eq_ignore_ascii_case(target))
            })
    }

    /// A starting point written by `lightdeck init`.
    pub fn example() -> Self {
        Self {
            api: ApiConfig::default(),
            lights: vec![
                DeviceConfig::new("", "Living"),
                DeviceConfig::new("", "Kitchen"),
                DeviceConfig::new("", "Bedroom"),
                DeviceConfig::new("", "Desk"),
            ],
            sensor: Some(DeviceConfig::new("", "Meter")),
            timings: Timings::default(),
        }
    }
}

impl ApiConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            errors.push(ValidationError::new(
                "api.base_url",
                format!("must start with http:// or https://, got '{}'", self.base_url),
            ));
        }
        if self.token.is_empty() {
            errors.push(ValidationError::new(
                "api.token",
                format!("is empty (set it in the file or via {})", TOKEN_ENV),
            ));
        }
        if self.secret.is_empty() {
            errors.push(ValidationError::new(
                "api.secret",
                format!("is empty (set it in the file or via {})", SECRET_ENV),
            ));
        }
        if !(1..=120).contains(&self.timeout_secs) {
            errors.push(ValidationError::new(
                "api.timeout_secs",
                format!("must be between 1 and 120 seconds, got {}", self.timeout_secs),
            ));
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `api.token` or `lights[2].id`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lightdeck")
        .join("config.toml")
}

/// Default log file for the touch panel.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lightdeck")
        .join("lightdeck.log")
}
