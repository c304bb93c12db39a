//! Error types for lightdeck-core.
//!
//! This module defines the errors that can occur when talking to the
//! device-control service.
//!
//! # Error Handling Strategy
//!
//! None of these errors are fatal to the touch panel. The controller logs
//! them and keeps showing the last known state:
//!
//! | Error Type | Raised when | Controller reaction |
//! |------------|-------------|---------------------|
//! | [`Error::InvalidArgument`] | Empty device ID, before any I/O | Logged, nothing sent |
//! | [`Error::Transport`] | Connection, TLS or timeout failure | Optimistic state kept |
//! | [`Error::CommandFailed`] | HTTP status outside `200..300` | Optimistic state kept |
//! | [`Error::MalformedResponse`] | Status document lacks a required field | Prior state kept |
//! | [`Error::InvalidConfig`] | Bad base URL or client setup | Startup aborts |
//!
//! Nothing is retried automatically. Refreshes happen again on the next
//! natural trigger (reconciliation timer, sensor interval, or waking the
//! screen).

use thiserror::Error;

/// Errors that can occur when talking to the device-control service.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request was rejected locally before any network attempt.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The request could not be delivered.
    #[error("Transport failure for {url}: {source}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("Command failed with HTTP {status}: {message}")]
    CommandFailed {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the status text.
        message: String,
    },

    /// A status document did not contain the expected fields.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a command failure from a status code and message.
    pub fn command_failed(status: u16, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            status,
            message: message.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether the request reached the wire and failed there
    /// (transport failure or non-2xx status).
    #[must_use]
    pub fn is_dispatch_failure(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::CommandFailed { .. })
    }
}

/// Result type alias using lightdeck-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_argument("device id is empty");
        assert_eq!(err.to_string(), "Invalid argument: device id is empty");

        let err = Error::command_failed(401, "Unauthorized");
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Unauthorized"));

        let err = Error::malformed("missing field 'brightness'");
        assert!(err.to_string().contains("brightness"));

        let err = Error::invalid_config("base URL must start with http");
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_dispatch_failure_classification() {
        assert!(Error::command_failed(500, "boom").is_dispatch_failure());
        assert!(!Error::invalid_argument("empty").is_dispatch_failure());
        assert!(!Error::malformed("missing").is_dispatch_failure());
        assert!(!Error::invalid_config("bad").is_dispatch_failure());
    }

    #[test]
    fn test_reqwest_error_is_source() {
        fn _assert_source<T: std::error::Error>() {}
        _assert_source::<Error>();
    }
}
