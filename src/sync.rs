//! Device sync channel: the resilient link between panel and device.
//!
//! The channel wraps a [`DeviceTransport`] and adds:
//!
//! - a connection state machine
//! - automatic reconnection after a fixed delay, tracked by a single owned
//!   deadline so attempts can never stack
//! - best-effort sending, with an optional bounded outbox
//! - parsing of inbound `updateValue` frames
//!
//! # State Machine
//!
//! ```text
//!                start()            Opened
//! Disconnected ──────────► Connecting ──────► Open
//!      ▲  ▲                    │                │
//!      │  └── Error / Closed ──┘                │
//!      │        (reconnect after delay)         │
//!      └────────────── Error / Closed ──────────┘
//!
//! shutdown(): Connecting/Open ──► Closing ──Closed──► Disconnected (no reconnect)
//! ```
//!
//! The channel never blocks and never reads the clock itself: call
//! [`poll`](DeviceSyncChannel::poll) regularly with the current time.
//!
//! # Example
//!
//! ```rust
//! use gpio_panel::hal::MockTransport;
//! use gpio_panel::messages::DeviceCommand;
//! use gpio_panel::sync::{ConnectionState, DeviceSyncChannel, SendOutcome};
//!
//! let mut channel = DeviceSyncChannel::new(MockTransport::new(), "ws://192.168.4.1/ws");
//!
//! // Not started: sends are dropped with a warning
//! assert!(matches!(channel.send(&DeviceCommand::ResetPins), SendOutcome::Dropped(_)));
//! assert_eq!(channel.stats().warnings, 1);
//!
//! channel.start(0);
//! channel.poll(0);
//! assert_eq!(channel.state(), ConnectionState::Open);
//! assert_eq!(channel.send(&DeviceCommand::ResetPins), SendOutcome::Sent);
//! ```

use heapless::Deque;
use serde::Serialize;

use crate::config::{SyncConfig, MAX_OUTBOX};
use crate::messages::{parse_notification, DeviceCommand, DeviceNotification};
use crate::traits::{DeviceTransport, TransportEvent};

/// Connection state of the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection; a reconnect may be pending.
    Disconnected,
    /// Attempt in progress.
    Connecting,
    /// Frames can be sent.
    Open,
    /// Shutting down; no reconnect will follow.
    Closing,
}

/// Why a command was not transmitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Channel was not open and the outbox is disabled.
    NotConnected,
    /// Transport rejected the frame.
    TransportError,
}

/// Result of [`DeviceSyncChannel::send`]. Sending never fails hard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Frame handed to the transport.
    Sent,
    /// Frame held in the outbox until the channel opens.
    Queued,
    /// Frame discarded; a warning was recorded.
    Dropped(DropReason),
}

impl SendOutcome {
    /// Short status name for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Queued => "queued",
            Self::Dropped(_) => "dropped",
        }
    }

    /// True unless the command was discarded.
    pub fn is_delivered_or_pending(&self) -> bool {
        !matches!(self, Self::Dropped(_))
    }
}

/// Counters kept by the channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    /// Frames handed to the transport
    pub sent: u64,
    /// Frames placed in the outbox
    pub queued: u64,
    /// Frames discarded (not connected, send error, outbox eviction, reset)
    pub dropped: u64,
    /// Warnings logged for dropped frames and transport errors
    pub warnings: u64,
    /// Inbound frames that could not be parsed
    pub protocol_errors: u64,
    /// Reconnect attempts made after a lost connection
    pub reconnects: u64,
}

type NotificationHandler = Box<dyn FnMut(&DeviceNotification) + Send>;

/// Resilient duplex channel to one device endpoint.
pub struct DeviceSyncChannel<T: DeviceTransport> {
    transport: T,
    endpoint: String,
    state: ConnectionState,
    running: bool,
    reconnect_delay_ms: u64,
    reconnect_at: Option<u64>,
    outbox: Deque<String, MAX_OUTBOX>,
    outbox_capacity: usize,
    stats: ChannelStats,
    handler: Option<NotificationHandler>,
}

impl<T: DeviceTransport> DeviceSyncChannel<T> {
    /// Channel with default [`SyncConfig`].
    pub fn new(transport: T, endpoint: &str) -> Self {
        Self::with_config(transport, endpoint, &SyncConfig::default())
    }

    /// Channel with explicit reconnect and outbox settings.
    pub fn with_config(transport: T, endpoint: &str, config: &SyncConfig) -> Self {
        Self {
            transport,
            endpoint: endpoint.to_string(),
            state: ConnectionState::Disconnected,
            running: false,
            reconnect_delay_ms: u64::from(config.reconnect_delay_ms),
            reconnect_at: None,
            outbox: Deque::new(),
            outbox_capacity: config.effective_outbox_capacity(),
            stats: ChannelStats::default(),
            handler: None,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True when frames can be sent.
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Device endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Counters.
    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Frames waiting in the outbox.
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Time of the pending reconnect attempt, if any.
    pub fn reconnect_at(&self) -> Option<u64> {
        self.reconnect_at
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Register the callback invoked for every parsed `updateValue` frame.
    ///
    /// Replaces any previous handler.
    pub fn on_notification<F>(&mut self, handler: F)
    where
        F: FnMut(&DeviceNotification) + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    /// Start connecting. Does nothing while connecting or open.
    ///
    /// Called during a [`shutdown`](Self::shutdown) that is still closing, the
    /// channel connects again as soon as the close completes.
    pub fn start(&mut self, now_ms: u64) {
        self.running = true;
        if self.state == ConnectionState::Disconnected {
            self.reconnect_at = None;
            self.connect(now_ms);
        }
    }

    /// Close the connection and stop reconnecting.
    pub fn shutdown(&mut self) {
        let idle = matches!(
            self.state,
            ConnectionState::Disconnected | ConnectionState::Closing
        );
        if !self.running && idle {
            return;
        }
        tracing::info!("Closing device channel to {}", self.endpoint);
        self.running = false;
        self.reconnect_at = None;
        if self.state == ConnectionState::Disconnected {
            // Waiting for a reconnect: nothing open to close.
            return;
        }
        self.state = ConnectionState::Closing;
        self.transport.close();
    }

    fn connect(&mut self, now_ms: u64) {
        tracing::info!("Connecting to device at {}", self.endpoint);
        self.state = ConnectionState::Connecting;
        if let Err(e) = self.transport.connect(&self.endpoint) {
            tracing::warn!("Connection to {} failed: {}", self.endpoint, e);
            self.stats.warnings += 1;
            self.connection_lost(now_ms);
        }
    }

    fn connection_lost(&mut self, now_ms: u64) {
        let was_closing = self.state == ConnectionState::Closing;
        self.state = ConnectionState::Disconnected;
        if !self.running {
            return;
        }
        if was_closing {
            // Restarted while the shutdown was in flight.
            self.connect(now_ms);
            return;
        }
        // Only one deadline at a time: Error followed by Closed must not stack.
        if self.reconnect_at.is_none() {
            let at = now_ms + self.reconnect_delay_ms;
            tracing::info!("Reconnecting in {} ms", self.reconnect_delay_ms);
            self.reconnect_at = Some(at);
        }
    }

    fn opened(&mut self) {
        if !self.running {
            return;
        }
        tracing::info!("Connected to device at {}", self.endpoint);
        self.state = ConnectionState::Open;
        self.reconnect_at = None;
        self.flush_outbox();
    }

    fn flush_outbox(&mut self) {
        while let Some(frame) = self.outbox.pop_front() {
            if !self.transmit(&frame) {
                break;
            }
        }
    }

    fn transmit(&mut self, frame: &str) -> bool {
        match self.transport.send_text(frame) {
            Ok(()) => {
                tracing::debug!("-> {}", frame);
                self.stats.sent += 1;
                true
            }
            Err(e) => {
                tracing::warn!("Send failed, frame dropped: {}", e);
                self.stats.warnings += 1;
                self.stats.dropped += 1;
                false
            }
        }
    }

    fn enqueue(&mut self, frame: String) {
        if self.outbox.len() >= self.outbox_capacity {
            if let Some(evicted) = self.outbox.pop_front() {
                tracing::warn!("Outbox full, evicting {}", evicted);
                self.stats.warnings += 1;
                self.stats.dropped += 1;
            }
        }
        if self.outbox.push_back(frame).is_ok() {
            self.stats.queued += 1;
        }
    }

    /// Send a command to the device.
    ///
    /// Never fails: when the channel is not open the command is queued (if the
    /// outbox is enabled) or dropped with a logged warning. Commands never
    /// overtake queued ones. A `resetPins` command discards anything already
    /// queued.
    pub fn send(&mut self, command: &DeviceCommand) -> SendOutcome {
        if matches!(command, DeviceCommand::ResetPins) && !self.outbox.is_empty() {
            tracing::debug!("Reset supersedes {} queued command(s)", self.outbox.len());
            self.stats.dropped += self.outbox.len() as u64;
            self.outbox.clear();
        }

        let frame = command.to_json();

        if self.state == ConnectionState::Open {
            // Frames left over from a failed flush go first.
            self.flush_outbox();
            if !self.outbox.is_empty() {
                self.enqueue(frame);
                return SendOutcome::Queued;
            }
            return if self.transmit(&frame) {
                SendOutcome::Sent
            } else {
                SendOutcome::Dropped(DropReason::TransportError)
            };
        }

        if self.outbox_capacity > 0 && self.running {
            self.enqueue(frame);
            return SendOutcome::Queued;
        }

        tracing::warn!(
            "Device not connected ({:?}), dropping {}",
            self.state,
            command.name()
        );
        self.stats.warnings += 1;
        self.stats.dropped += 1;
        SendOutcome::Dropped(DropReason::NotConnected)
    }

    /// Process pending transport events and run the reconnect timer.
    ///
    /// Returns every notification parsed in this call, in arrival order. The
    /// registered handler (if any) has already seen each of them.
    pub fn poll(&mut self, now_ms: u64) -> Vec<DeviceNotification> {
        let mut notifications = Vec::new();

        while let Some(event) = self.transport.poll_event() {
            match event {
                TransportEvent::Opened => self.opened(),
                TransportEvent::Message(frame) => {
                    tracing::debug!("<- {}", frame);
                    match parse_notification(&frame) {
                        Ok(note) => {
                            if let Some(handler) = self.handler.as_mut() {
                                handler(&note);
                            }
                            notifications.push(note);
                        }
                        Err(e) => {
                            tracing::warn!("Discarding inbound frame: {}", e);
                            self.stats.protocol_errors += 1;
                        }
                    }
                }
                TransportEvent::Error(reason) => {
                    if self.state == ConnectionState::Closing {
                        // Closed follows.
                        tracing::debug!("Error while closing: {}", reason);
                    } else {
                        tracing::warn!("Device connection error: {}", reason);
                        self.stats.warnings += 1;
                        self.connection_lost(now_ms);
                    }
                }
                TransportEvent::Closed => {
                    if self.state == ConnectionState::Open {
                        tracing::info!("Device connection closed");
                    }
                    self.connection_lost(now_ms);
                }
            }
        }

        if self.state == ConnectionState::Disconnected {
            if let Some(at) = self.reconnect_at {
                if now_ms >= at {
                    self.reconnect_at = None;
                    self.stats.reconnects += 1;
                    self.connect(now_ms);
                }
            }
        }

        notifications
    }
}
