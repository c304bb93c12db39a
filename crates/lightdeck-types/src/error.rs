//! Error types for value parsing in lightdeck-types.

use thiserror::Error;

/// Errors that can occur when parsing device values from text.
///
/// This error type is transport-agnostic; HTTP and response-document
/// errors belong in lightdeck-core.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The text is not a recognised light command.
    #[error("Unknown command '{0}' (expected on, off or a brightness 1-100)")]
    UnknownCommand(String),

    /// A numeric value could not be parsed.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias using lightdeck-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
