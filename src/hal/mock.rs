//! Mock implementations for testing without a device.
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockTransport`] | [`DeviceTransport`] | Captures sent frames, replays queued events |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
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
//! panel.poll(0); // consumes the Opened event
//!
//! panel
//!     .commit("IO5", "GPIO", ConfigIntent::gpio(GpioDirection::Output))
//!     .unwrap();
//!
//! assert_eq!(panel.channel().transport().sent_commands(), ["configurePin"]);
//! ```
//!
//! [`DeviceTransport`]: crate::traits::DeviceTransport
//! [`Clock`]: crate::traits::Clock

use std::collections::VecDeque;

use serde_json::Value;
use thiserror::Error;

use crate::traits::{Clock, DeviceTransport, TransportEvent};

// ============================================================================
// Clock
// ============================================================================

/// Mock clock for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use gpio_panel::hal::MockClock;
/// use gpio_panel::traits::Clock;
///
/// let mut clock = MockClock::new();
/// clock.set(1000);
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Failures a [`MockTransport`] can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MockTransportError {
    /// `fail_connect` was set.
    #[error("connection refused")]
    ConnectRefused,
    /// `fail_send` was set.
    #[error("send failed")]
    SendFailed,
}

/// Mock device transport.
///
/// Records every frame sent and every connect attempt, and hands out queued
/// events from [`poll_event`](DeviceTransport::poll_event). With `auto_open`
/// set (the default from [`new`](Self::new)) every `connect` immediately
/// queues an `Opened` event.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Frames passed to `send_text`, in order.
    pub sent: Vec<String>,
    /// Endpoints passed to `connect`, one per attempt.
    pub connects: Vec<String>,
    /// Pending events returned by `poll_event`.
    pub events: VecDeque<TransportEvent>,
    /// Queue `Opened` on every successful `connect`.
    pub auto_open: bool,
    /// Make `connect` return an error.
    pub fail_connect: bool,
    /// Make `send_text` return an error.
    pub fail_send: bool,
    /// Number of `close` calls.
    pub close_calls: usize,
}

impl MockTransport {
    /// Transport whose connection attempts always succeed.
    pub fn new() -> Self {
        Self {
            auto_open: true,
            ..Default::default()
        }
    }

    /// Transport that never opens on its own; queue events by hand.
    pub fn offline() -> Self {
        Self::default()
    }

    /// Queue an arbitrary event.
    pub fn queue_event(&mut self, event: TransportEvent) {
        self.events.push_back(event);
    }

    /// Queue an inbound text frame.
    pub fn queue_message(&mut self, frame: impl Into<String>) {
        self.events.push_back(TransportEvent::Message(frame.into()));
    }

    /// Simulate a lost connection (`Error` then `Closed`).
    pub fn drop_connection(&mut self) {
        self.events
            .push_back(TransportEvent::Error("connection reset".into()));
        self.events.push_back(TransportEvent::Closed);
    }

    /// Sent frames parsed as JSON.
    pub fn sent_json(&self) -> Vec<Value> {
        self.sent
            .iter()
            .filter_map(|frame| serde_json::from_str(frame).ok())
            .collect()
    }

    /// `command` field of every sent frame.
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent_json()
            .iter()
            .filter_map(|v| v.get("command").and_then(Value::as_str).map(String::from))
            .collect()
    }
}

impl DeviceTransport for MockTransport {
    type Error = MockTransportError;

    fn connect(&mut self, endpoint: &str) -> Result<(), MockTransportError> {
        self.connects.push(endpoint.to_string());
        if self.fail_connect {
            return Err(MockTransportError::ConnectRefused);
        }
        if self.auto_open {
            self.events.push_back(TransportEvent::Opened);
        }
        Ok(())
    }

    fn send_text(&mut self, frame: &str) -> Result<(), MockTransportError> {
        if self.fail_send {
            return Err(MockTransportError::SendFailed);
        }
        self.sent.push(frame.to_string());
        Ok(())
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.events.pop_front()
    }

    fn close(&mut self) {
        self.close_calls += 1;
        self.events.push_back(TransportEvent::Closed);
    }
}
