//! Device transport abstraction.
//!
//! The transport carries JSON text frames to and from exactly one device.
//! It uses a **sync-first, poll-based design**: `connect` only starts an
//! attempt, and its result (open, error, close) is reported later through
//! [`poll_event`](DeviceTransport::poll_event), the same way a browser
//! WebSocket reports `onopen`/`onerror`/`onclose`.
//!
//! ```text
//! connect() ──► Opened ──► Message* ──► Error? ──► Closed
//!          └──► Error ──► Closed            (attempt failed)
//! ```
//!
//! Reconnect policy does not belong here; the
//! [`DeviceSyncChannel`](crate::sync::DeviceSyncChannel) owns it.

/// Lifecycle or data event produced by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection is established and frames can be sent.
    Opened,
    /// One inbound text frame.
    Message(String),
    /// Transport-level failure. Always followed by `Closed`.
    Error(String),
    /// Connection is gone.
    Closed,
}

/// Duplex text-frame link to the device.
///
/// # Implementation Notes
///
/// - Every method is non-blocking
/// - `poll_event` returns `None` when nothing is pending
/// - A transport may be reconnected by calling `connect` again after `Closed`
///
/// # Example
///
/// ```rust
/// use gpio_panel::hal::MockTransport;
/// use gpio_panel::traits::{DeviceTransport, TransportEvent};
///
/// let mut transport = MockTransport::new();
/// transport.connect("ws://192.168.4.1/ws").unwrap();
/// assert_eq!(transport.poll_event(), Some(TransportEvent::Opened));
///
/// transport.send_text(r#"{"command":"resetPins"}"#).unwrap();
/// assert_eq!(transport.sent.len(), 1);
/// ```
pub trait DeviceTransport {
    /// Error type for connect/send failures.
    type Error: core::fmt::Display;

    /// Begin connecting to `endpoint`.
    fn connect(&mut self, endpoint: &str) -> Result<(), Self::Error>;

    /// Send one text frame. Only valid after `Opened`.
    fn send_text(&mut self, frame: &str) -> Result<(), Self::Error>;

    /// Next pending event, if any.
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Start closing the connection. A `Closed` event follows.
    fn close(&mut self);
}
