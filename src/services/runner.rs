//! Sync runner: drives the device channel on a fixed interval.
//!
//! The channel is poll-based, so something has to call
//! [`Panel::poll`](crate::Panel::poll) regularly. `SyncRunner` does that on a
//! tokio interval, using the shared state's clock for reconnect deadlines.
//!
//! # Example
//!
//! ```ignore
//! use gpio_panel::services::{SharedPanel, SyncRunner};
//!
//! let state = Arc::new(SharedPanel::new(panel));
//! let runner = SyncRunner::new(Arc::clone(&state), &config.sync);
//!
//! tokio::spawn(runner.run_until(tokio::signal::ctrl_c()));
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::sync::ConnectionState;
use crate::traits::DeviceTransport;

use super::SharedPanel;

/// Poll intervals [`SyncRunner::stop`] waits for the close to be reported.
pub const CLOSE_WAIT_TICKS: u32 = 10;

/// Periodic poller for a [`SharedPanel`].
pub struct SyncRunner<T: DeviceTransport> {
    state: Arc<SharedPanel<T>>,
    interval: Duration,
}

impl<T: DeviceTransport> SyncRunner<T> {
    /// Create a runner polling every `config.poll_interval_ms` (at least 1 ms).
    pub fn new(state: Arc<SharedPanel<T>>, config: &SyncConfig) -> Self {
        Self {
            state,
            interval: Duration::from_millis(u64::from(config.poll_interval_ms.max(1))),
        }
    }

    /// Poll interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the channel.
    pub fn start(&self) {
        let now_ms = self.state.now_ms();
        self.state.with_panel(|panel| panel.start(now_ms));
    }

    /// One poll pass. Returns how many device updates were applied.
    pub fn poll(&self) -> usize {
        let now_ms = self.state.now_ms();
        self.state.with_panel(|panel| panel.poll(now_ms))
    }

    /// Start the channel and poll until `shutdown` resolves, then close it.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future,
    {
        self.start();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let applied = self.poll();
                    if applied > 0 {
                        tracing::debug!("Applied {} device update(s)", applied);
                    }
                }
            }
        }

        tracing::info!("Sync runner stopping");
        self.stop().await;
    }

    /// Close the channel and poll until the transport reports the close.
    ///
    /// Waits at most [`CLOSE_WAIT_TICKS`] intervals. Returns false if the
    /// close was never reported.
    pub async fn stop(&self) -> bool {
        self.state.with_panel(|panel| panel.shutdown());
        let mut ticker = tokio::time::interval(self.interval);
        for _ in 0..CLOSE_WAIT_TICKS {
            ticker.tick().await;
            self.poll();
            if self.state.status().connection == ConnectionState::Disconnected {
                return true;
            }
        }
        tracing::warn!("Device channel did not report close");
        false
    }

    /// Start the channel and poll forever.
    pub async fn run(self) {
        self.run_until(std::future::pending::<()>()).await;
    }
}
