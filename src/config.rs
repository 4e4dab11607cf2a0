//! Panel configuration.
//!
//! Uses `heapless::String` for bounded config strings, same as the device
//! firmware side, and loads from TOML on the desktop host.
//!
//! # Example
//!
//! ```rust
//! use gpio_panel::config::{Config, DeviceConfig, SyncConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.device.endpoint.as_str(), "ws://192.168.4.1/ws");
//!
//! // Or customize
//! let config = Config::default()
//!     .with_device(DeviceConfig::default().with_endpoint("ws://10.0.0.7/ws"))
//!     .with_sync(SyncConfig::default().with_outbox_capacity(8))
//!     .with_web(WebConfig::default().with_port(3000));
//! ```

use std::path::Path;

use heapless::String as HString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum length for short config strings (names, log levels)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (URLs)
pub const MAX_LONG_STRING: usize = 128;

/// Largest outbox the sync channel supports.
pub const MAX_OUTBOX: usize = 16;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

/// Address of the ESP32 in access-point mode.
pub const DEFAULT_ENDPOINT: &str = "ws://192.168.4.1/ws";

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= N)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    truncated(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device endpoint and identification
    pub device: DeviceConfig,
    /// Device sync channel behaviour
    pub sync: SyncConfig,
    /// HTTP API configuration
    pub web: WebConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Set sync channel configuration
    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device endpoint configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// WebSocket URL of the device
    pub endpoint: LongString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("esp32-devkit"),
            endpoint: long_string(DEFAULT_ENDPOINT),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the WebSocket endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = long_string(endpoint);
        self
    }
}

// ============================================================================
// Sync Config
// ============================================================================

/// Device sync channel configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delay between a lost connection and the next attempt
    pub reconnect_delay_ms: u32,
    /// How often the host polls the channel for events
    pub poll_interval_ms: u32,
    /// Commands held while disconnected (0 = drop them)
    pub outbox_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 2000,
            poll_interval_ms: 20,
            outbox_capacity: 0,
        }
    }
}

impl SyncConfig {
    /// Set the reconnect delay
    pub fn with_reconnect_delay_ms(mut self, ms: u32) -> Self {
        self.reconnect_delay_ms = ms;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the outbox capacity, clamped to [`MAX_OUTBOX`]
    pub fn with_outbox_capacity(mut self, capacity: usize) -> Self {
        self.outbox_capacity = capacity.min(MAX_OUTBOX);
        self
    }

    /// Outbox capacity after clamping (values loaded from TOML are not clamped on parse)
    pub fn effective_outbox_capacity(&self) -> usize {
        self.outbox_capacity.min(MAX_OUTBOX)
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Whether web server is enabled
    pub enabled: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_permissive: true,
            enabled: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Enable or disable web server
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Logging Config
// ============================================================================

/// Log output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: ShortString,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: short_string("info"),
        }
    }
}

impl LoggingConfig {
    /// Set the default filter directive
    pub fn with_level(mut self, level: &str) -> Self {
        self.level = short_string(level);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
