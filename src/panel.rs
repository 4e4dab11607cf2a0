//! The panel: one configuration store and one device channel, wired together.
//!
//! [`Panel`] drives the whole control flow:
//!
//! ```text
//! user intent ─► ConfigStore::commit ─► DeviceSyncChannel::send ─► device
//!                                                                    │
//! dashboard ◄─ StoreEvent ◄─ ConfigStore::apply_device_update ◄─ poll ┘
//! ```
//!
//! All operations take `&mut self`, so store writes are mutually exclusive.
//! Share a panel between tasks through
//! [`SharedPanel`](crate::services::SharedPanel) (features `web`/`ws`).
//!
//! # Example
//!
//! ```rust
//! use gpio_panel::hal::MockTransport;
//! use gpio_panel::store::{ConfigIntent, GpioDirection};
//! use gpio_panel::Panel;
//!
//! let mut panel = Panel::new(MockTransport::new(), "ws://192.168.4.1/ws");
//! panel.start(0);
//! panel.poll(0);
//!
//! panel
//!     .commit("IO5", "GPIO5", ConfigIntent::gpio(GpioDirection::Output))
//!     .unwrap();
//! panel.set_pin_state("IO5", 1).unwrap();
//!
//! // Device echoes the new level
//! panel
//!     .channel_mut()
//!     .transport_mut()
//!     .queue_message(r#"{"command":"updateValue","pinId":"IO5","value":1}"#);
//! panel.poll(20);
//!
//! assert_eq!(panel.dashboard()[0].lines[1], "State: HIGH");
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::config::Config;
use crate::dashboard::{Dashboard, DashboardEntry};
use crate::error::PanelError;
use crate::messages::DeviceCommand;
use crate::store::{ConfigIntent, ConfigStore, EditSession, PinConfiguration, UpdateOutcome};
use crate::sync::{ChannelStats, ConnectionState, DeviceSyncChannel, SendOutcome};
use crate::traits::{Clock, DeviceTransport};

/// Result of a successful commit.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitOutcome {
    /// Configuration as stored.
    pub config: PinConfiguration,
    /// What happened to the `configurePin` command.
    pub delivery: SendOutcome,
}

/// Snapshot of connection and store state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelStatus {
    /// Device endpoint
    pub endpoint: String,
    /// Channel state
    pub connection: ConnectionState,
    /// Number of configured pins
    pub configured_pins: usize,
    /// Commands waiting in the outbox
    pub pending: usize,
    /// Channel counters
    pub stats: ChannelStats,
}

/// Store plus channel, owned together.
pub struct Panel<T: DeviceTransport> {
    store: ConfigStore,
    channel: DeviceSyncChannel<T>,
    dashboard: Arc<Mutex<Dashboard>>,
}

impl<T: DeviceTransport> Panel<T> {
    /// Panel over the ESP32 DevKit catalog with default sync settings.
    pub fn new(transport: T, endpoint: &str) -> Self {
        Self::with_parts(ConfigStore::new(), DeviceSyncChannel::new(transport, endpoint))
    }

    /// Panel built from application configuration.
    pub fn from_config(transport: T, config: &Config) -> Self {
        let endpoint = config.device.endpoint.as_str();
        let channel = DeviceSyncChannel::with_config(transport, endpoint, &config.sync);
        Self::with_parts(ConfigStore::new(), channel)
    }

    /// Panel from an existing store and channel.
    pub fn with_parts(mut store: ConfigStore, channel: DeviceSyncChannel<T>) -> Self {
        let dashboard = Arc::new(Mutex::new(Dashboard::from_store(&store)));
        let sink = Arc::clone(&dashboard);
        store.subscribe(move |event| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .apply(event);
        });
        Self {
            store,
            channel,
            dashboard,
        }
    }

    /// The configuration store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// The device channel.
    pub fn channel(&self) -> &DeviceSyncChannel<T> {
        &self.channel
    }

    /// Mutable access to the device channel.
    pub fn channel_mut(&mut self) -> &mut DeviceSyncChannel<T> {
        &mut self.channel
    }

    /// Start connecting to the device.
    pub fn start(&mut self, now_ms: u64) {
        self.channel.start(now_ms);
    }

    /// Close the device connection for good.
    pub fn shutdown(&mut self) {
        self.channel.shutdown();
    }

    /// Open a pin for editing.
    pub fn begin_edit(&self, pin_id: &str) -> Result<EditSession, PanelError> {
        self.store.begin_edit(pin_id)
    }

    /// Save a pin configuration and send it to the device.
    pub fn commit(
        &mut self,
        pin_id: &str,
        function: &str,
        intent: ConfigIntent,
    ) -> Result<CommitOutcome, PanelError> {
        let config = self.store.commit(pin_id, function, intent)?;
        let delivery = self.channel.send(&DeviceCommand::configure(&config));
        Ok(CommitOutcome { config, delivery })
    }

    /// Drive a saved GPIO output. Any non-zero `value` means HIGH.
    ///
    /// The stored level is left alone until the device reports it back.
    pub fn set_pin_state(&mut self, pin_id: &str, value: u8) -> Result<SendOutcome, PanelError> {
        let pin = self.store.catalog().classify(pin_id)?;
        if pin.is_excluded() {
            return Err(PanelError::ExcludedPin(pin.id));
        }
        let pin_id = pin.id;
        if !self.store.get(pin_id).is_some_and(PinConfiguration::is_output) {
            return Err(PanelError::NotOutput(pin_id));
        }
        let level = u8::from(value != 0);
        Ok(self.channel.send(&DeviceCommand::set_pin_state(pin_id, level)))
    }

    /// Clear every configuration and tell the device to release its pins.
    pub fn reset(&mut self) -> SendOutcome {
        self.store.reset();
        self.channel.send(&DeviceCommand::ResetPins)
    }

    /// Process device traffic and apply reported values to the store.
    ///
    /// Returns how many notifications changed the store.
    pub fn poll(&mut self, now_ms: u64) -> usize {
        self.channel
            .poll(now_ms)
            .into_iter()
            .filter(|note| {
                let outcome = self.store.apply_device_update(&note.pin_id, note.value);
                if outcome != UpdateOutcome::Applied {
                    tracing::debug!("Update for {} not applied: {:?}", note.pin_id, outcome);
                }
                outcome == UpdateOutcome::Applied
            })
            .count()
    }

    /// [`poll`](Self::poll) using a clock.
    pub fn tick<C: Clock>(&mut self, clock: &C) -> usize {
        self.poll(clock.now_ms())
    }

    /// Dashboard cards in first-save order.
    pub fn dashboard(&self) -> Vec<DashboardEntry> {
        self.dashboard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .to_vec()
    }

    /// Connection and store summary.
    pub fn status(&self) -> PanelStatus {
        PanelStatus {
            endpoint: self.channel.endpoint().to_string(),
            connection: self.channel.state(),
            configured_pins: self.store.len(),
            pending: self.channel.pending(),
            stats: self.channel.stats(),
        }
    }
}
