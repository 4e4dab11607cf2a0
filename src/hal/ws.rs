//! WebSocket transport to the ESP32 (tokio-tungstenite).
//!
//! Each `connect` spawns one tokio task that owns the socket. The task feeds
//! lifecycle events and inbound text frames into an unbounded channel that
//! [`poll_event`](DeviceTransport::poll_event) drains without blocking, and
//! writes whatever `send_text` pushes into the outgoing channel.
//!
//! Must be used from inside a tokio runtime.
//!
//! # Example
//!
//! ```ignore
//! use gpio_panel::hal::WsTransport;
//! use gpio_panel::Panel;
//!
//! let mut panel = Panel::new(WsTransport::new(), "ws://192.168.4.1/ws");
//! panel.start(0);
//! ```

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::traits::{DeviceTransport, TransportEvent};

/// WebSocket transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WsError {
    /// `connect` was called outside a tokio runtime.
    #[error("no tokio runtime available")]
    NoRuntime,
    /// No connection task is running.
    #[error("not connected")]
    NotConnected,
}

/// WebSocket client transport.
#[derive(Debug, Default)]
pub struct WsTransport {
    events: Option<UnboundedReceiver<TransportEvent>>,
    outgoing: Option<UnboundedSender<String>>,
    task: Option<JoinHandle<()>>,
}

impl WsTransport {
    /// Transport with no connection.
    pub fn new() -> Self {
        Self::default()
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.outgoing = None;
        self.events = None;
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.abort();
    }
}

impl DeviceTransport for WsTransport {
    type Error = WsError;

    fn connect(&mut self, endpoint: &str) -> Result<(), WsError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| WsError::NoRuntime)?;
        self.abort();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let url = endpoint.to_string();

        self.task = Some(runtime.spawn(run_socket(url, event_tx, out_rx)));
        self.events = Some(event_rx);
        self.outgoing = Some(out_tx);
        Ok(())
    }

    fn send_text(&mut self, frame: &str) -> Result<(), WsError> {
        let outgoing = self.outgoing.as_ref().ok_or(WsError::NotConnected)?;
        outgoing
            .send(frame.to_string())
            .map_err(|_| WsError::NotConnected)
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        let events = self.events.as_mut()?;
        match events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.events = None;
                None
            }
        }
    }

    fn close(&mut self) {
        // Dropping the sender makes the task send a Close frame and exit.
        self.outgoing = None;
    }
}

async fn run_socket(
    url: String,
    events: UnboundedSender<TransportEvent>,
    mut outgoing: UnboundedReceiver<String>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let _ = events.send(TransportEvent::Error(e.to_string()));
            let _ = events.send(TransportEvent::Closed);
            return;
        }
    };
    let _ = events.send(TransportEvent::Opened);

    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            frame = outgoing.recv() => match frame {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text)).await {
                        let _ = events.send(TransportEvent::Error(e.to_string()));
                        break;
                    }
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Message(text));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    break;
                }
            },
        }
    }
    let _ = events.send(TransportEvent::Closed);
}
