//! # gpio-panel
//!
//! Host-side configuration panel for the pins of an ESP32 DevKit board.
//!
//! ## Features
//!
//! - **Pin catalog**: Static board description with capability classes,
//!   candidate functions and ADC channels
//! - **Configuration store**: Validated GPIO/PWM/ADC assignments, input-only
//!   coercion, PWM defaults
//! - **Device sync**: JSON commands over a WebSocket, automatic reconnect,
//!   optional bounded outbox
//! - **Dashboard**: Render-agnostic summary of active assignments
//! - **HTTP API**: Axum server for any front-end (feature `web`)
//!
//! ## Architecture
//!
//! The crate is structured to allow testing without a device:
//!
//! - `catalog` - Board pins and candidate functions
//! - `store` - Configuration store and validation rules
//! - `messages` - Wire protocol
//! - `sync` - Device sync channel
//! - `panel` - Store and channel wired together
//! - `traits` - Transport and clock abstractions
//! - `hal` - Concrete transports (mock for testing, WebSocket for hardware)
//!
//! ## Example
//!
//! ```rust
//! use gpio_panel::{
//!     hal::MockTransport,
//!     store::{ConfigIntent, GpioDirection},
//!     Panel, PanelError,
//! };
//!
//! let mut panel = Panel::new(MockTransport::new(), "ws://192.168.4.1/ws");
//! panel.start(0);
//! panel.poll(0);
//!
//! // Power pins are rejected with a user-facing notice
//! let err = panel.begin_edit("GND").unwrap_err();
//! assert_eq!(err, PanelError::ExcludedPin("GND"));
//!
//! // PWM with a bad frequency falls back to 1000 Hz
//! let intent = ConfigIntent::default().with_freq("abc").with_duty(70);
//! panel.commit("IO2", "PWM", intent).unwrap();
//! assert_eq!(panel.dashboard()[0].lines[0], "Freq: 1000 Hz");
//!
//! // Poll in your main loop
//! panel.poll(20);
//! ```

#![warn(missing_docs)]

/// Static board description.
pub mod catalog;
/// Application configuration with TOML loading.
pub mod config;
/// Render-agnostic dashboard cards.
pub mod dashboard;
/// Error types.
pub mod error;
/// Transport implementations with mocks for testing.
pub mod hal;
/// Wire protocol between panel and device (serde-based).
pub mod messages;
/// Store and channel wired together.
pub mod panel;
/// Configuration store.
pub mod store;
/// Device sync channel with reconnect.
pub mod sync;
/// Transport and clock abstractions.
pub mod traits;

/// Shared state, poll loop and HTTP API (feature-gated).
pub mod services;

// Re-exports for convenience
pub use catalog::{CapabilityClass, FunctionKind, PinCatalog, PinDescriptor};
pub use dashboard::{Dashboard, DashboardEntry};
pub use error::{ConfigError, PanelError, ProtocolError};
pub use messages::{DeviceCommand, DeviceNotification};
pub use panel::{CommitOutcome, Panel, PanelStatus};
pub use store::{
    ConfigIntent, ConfigStore, EditSession, FunctionSettings, GpioDirection, PinConfiguration,
    UpdateOutcome, VisualClass,
};
pub use sync::{ChannelStats, ConnectionState, DeviceSyncChannel, SendOutcome};
pub use traits::{Clock, DeviceTransport, TransportEvent};
