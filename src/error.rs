//! Error types for the panel.
//!
//! Nothing here is fatal. [`PanelError`] is surfaced to whoever drives the UI
//! (as an informational notice), [`ProtocolError`] is logged and the frame is
//! discarded, and [`ConfigError`] only occurs while loading configuration at
//! startup.

use thiserror::Error;

/// User-intent level errors raised by the catalog, store, and panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    /// Pin id is not part of the fixed catalog.
    #[error("Unknown pin: {0}")]
    UnknownPin(String),

    /// Pin is a power or system pin.
    #[error("Pin {0} is a power or system pin and cannot be configured as GPIO.")]
    ExcludedPin(&'static str),

    /// Chosen function label is not one of the pin's candidate functions.
    #[error("Function '{label}' is not available on pin {pin}")]
    InvalidFunction {
        /// Pin the commit targeted.
        pin: &'static str,
        /// Rejected function label.
        label: String,
    },

    /// Chosen function label exists but maps to no configurable function kind.
    #[error("Function '{label}' on pin {pin} cannot be configured from the panel")]
    UnsupportedFunction {
        /// Pin the commit targeted.
        pin: &'static str,
        /// Label without a GPIO/PWM/ADC kind.
        label: String,
    },

    /// State command sent to a pin that is not a saved GPIO output.
    #[error("Pin {0} is not configured as Output")]
    NotOutput(&'static str),
}

impl PanelError {
    /// HTTP-ish status code used by the API layer.
    pub fn status(&self) -> u16 {
        match self {
            Self::UnknownPin(_) => 404,
            Self::ExcludedPin(_) => 403,
            Self::InvalidFunction { .. } | Self::UnsupportedFunction { .. } => 400,
            Self::NotOutput(_) => 409,
        }
    }
}

/// Inbound frame errors. The channel logs these and keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Frame text is not valid JSON.
    #[error("malformed JSON frame: {0}")]
    Malformed(String),

    /// JSON object without a string `command` field.
    #[error("frame has no command field")]
    MissingCommand,

    /// `command` value this panel does not handle.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Known command with missing or mistyped fields.
    #[error("invalid {command} payload: {reason}")]
    InvalidPayload {
        /// Command discriminator of the frame.
        command: String,
        /// Deserializer message.
        reason: String,
    },
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`Config`](crate::config::Config).
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
