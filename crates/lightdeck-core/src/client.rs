//! HTTP client for the SwitchBot-style device-control service.
//!
//! This module provides a signed client for sending light commands and
//! reading device status. Every request gets a fresh freshness token and
//! nonce (see [`crate::signing`]).
//!
//! # Example
//!
//! ```no_run
//! use lightdeck_core::client::SwitchBotClient;
//! use lightdeck_core::signing::Credentials;
//! use lightdeck_core::DeviceApi;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("api-token", "signing-secret");
//! let client = SwitchBotClient::new("https://api.switch-bot.com/v1.1", credentials)?;
//!
//! client.send_command("94A99076A08A", "turnOn", "default").await?;
//! let status = client.read_light_status("94A99076A08A").await?;
//! println!("on={} brightness={}", status.is_on, status.brightness);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::signing::Credentials;
use crate::status::StatusDocument;
use crate::traits::DeviceApi;

/// Public SwitchBot API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.switch-bot.com/v1.1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `POST /devices/{id}/commands`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandBody<'a> {
    command: &'a str,
    parameter: &'a str,
    command_type: &'a str,
}

/// Signed HTTP client for the device-control service.
#[derive(Debug, Clone)]
pub struct SwitchBotClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl SwitchBotClient {
    /// Create a new client with the default timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.switch-bot.com/v1.1`
    /// * `credentials` - API token and signing secret
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        Self::with_timeout(base_url, credentials, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to build HTTP client: {}", e)))?;

        Self::with_client(base_url, credentials, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, credentials: Credentials, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            credentials,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Build `POST /devices/{id}/commands` without sending it.
    pub fn command_request(&self, device_id: &str, command: &str, parameter: &str) -> Result<Request> {
        let url = self.device_url(device_id, "commands")?;
        let body = CommandBody {
            command,
            parameter,
            command_type: "command",
        };
        let headers = self.credentials.sign()?;
        debug!(url = %url, t = %headers.t, nonce = %headers.nonce, "Signed command request");

        headers
            .apply(self.client.post(url.clone()).json(&body))
            .build()
            .map_err(|e| Error::Transport {
                url: url.to_string(),
                source: e,
            })
    }

    /// Build `GET /devices/{id}/status` without sending it.
    pub fn status_request(&self, device_id: &str) -> Result<Request> {
        let url = self.device_url(device_id, "status")?;
        let headers = self.credentials.sign()?;
        debug!(url = %url, t = %headers.t, nonce = %headers.nonce, "Signed status request");

        headers
            .apply(self.client.get(url.clone()))
            .build()
            .map_err(|e| Error::Transport {
                url: url.to_string(),
                source: e,
            })
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    fn device_url(&self, device_id: &str, leaf: &str) -> Result<Url> {
        if device_id.is_empty() {
            return Err(Error::invalid_argument("device id is empty"));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::invalid_config(format!("base URL {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(["devices", device_id, leaf]);
        Ok(url)
    }

    async fn execute(&self, request: Request) -> Result<(StatusCode, String)> {
        let url = request.url().to_string();
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::Transport {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport { url, source: e })?;
        Ok((status, body))
    }
}

#[async_trait]
impl DeviceApi for SwitchBotClient {
    async fn send_command(&self, device_id: &str, command: &str, parameter: &str) -> Result<()> {
        let request = self.command_request(device_id, command, parameter)?;
        info!(device_id, command, parameter, "Sending command");

        let (status, body) = self.execute(request).await?;
        debug!(device_id, status = status.as_u16(), body = %body, "Command response");
        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status, &body))
        }
    }

    async fn read_status(&self, device_id: &str) -> Result<StatusDocument> {
        let request = self.status_request(device_id)?;
        debug!(device_id, "Reading status");

        let (status, body) = self.execute(request).await?;
        debug!(device_id, status = status.as_u16(), body = %body, "Status response");
        if status.is_success() {
            StatusDocument::parse(&body)
        } else {
            Err(api_error(status, &body))
        }
    }
}

/// Normalize and validate the API root.
fn parse_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim_end_matches('/');
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(Error::invalid_config(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }
    Url::parse(trimmed).map_err(|e| Error::invalid_config(format!("invalid URL '{}': {}", base_url, e)))
}

/// Map a non-success response to [`Error::CommandFailed`].
fn api_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| status.to_string());
    Error::command_failed(status.as_u16(), message)
}
