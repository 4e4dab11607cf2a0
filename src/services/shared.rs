//! Shared panel state for all services.
//!
//! `SharedPanel` wraps the single [`Panel`] behind a mutex so the HTTP API
//! and the sync runner can use it from different tasks. Every store write
//! happens under that one lock, so commits, device updates and resets never
//! interleave.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gpio_panel::hal::MockTransport;
//! use gpio_panel::services::SharedPanel;
//! use gpio_panel::Panel;
//!
//! let state = Arc::new(SharedPanel::new(Panel::new(MockTransport::new(), "ws://192.168.4.1/ws")));
//!
//! let now_ms = state.now_ms();
//! state.with_panel(|panel| panel.start(now_ms));
//! assert_eq!(state.status().configured_pins, 0);
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::dashboard::DashboardEntry;
use crate::panel::{Panel, PanelStatus};
use crate::traits::{Clock, DeviceTransport};

/// Thread-safe owner of the process-wide [`Panel`].
pub struct SharedPanel<T: DeviceTransport> {
    /// The panel, needs mutable access for every write
    panel: Mutex<Panel<T>>,

    /// Time base for `now_ms()` across all services
    start_time: Instant,
}

impl<T: DeviceTransport> SharedPanel<T> {
    /// Wrap a panel. `start_time` becomes the time base for [`now_ms`](Self::now_ms).
    pub fn new(panel: Panel<T>) -> Self {
        Self {
            panel: Mutex::new(panel),
            start_time: Instant::now(),
        }
    }

    /// Milliseconds since this state was created.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// The start time instant.
    #[inline]
    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Run a closure with exclusive access to the panel.
    ///
    /// The closure form keeps the lock from being held across an await point.
    pub fn with_panel<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Panel<T>) -> R,
    {
        let mut guard = self.panel.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }

    /// Connection and store summary.
    pub fn status(&self) -> PanelStatus {
        self.with_panel(|panel| panel.status())
    }

    /// Dashboard cards.
    pub fn dashboard(&self) -> Vec<DashboardEntry> {
        self.with_panel(|panel| panel.dashboard())
    }
}

impl<T: DeviceTransport> Clock for SharedPanel<T> {
    fn now_ms(&self) -> u64 {
        SharedPanel::now_ms(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockTransport;
    use crate::store::{ConfigIntent, GpioDirection};
    use crate::sync::ConnectionState;
    use std::sync::Arc;

    fn shared() -> Arc<SharedPanel<MockTransport>> {
        Arc::new(SharedPanel::new(Panel::new(
            MockTransport::new(),
            "ws://192.168.4.1/ws",
        )))
    }

    #[test]
    fn test_shared_panel_creation() {
        let state = shared();
        assert!(state.now_ms() < 100);
        assert!(state.start_time().elapsed().as_millis() < 100);
    }

    #[test]
    fn test_with_panel_access() {
        let state = shared();
        state.with_panel(|panel| {
            panel.start(0);
            panel.poll(0);
        });
        assert_eq!(state.status().connection, ConnectionState::Open);
    }

    #[test]
    fn test_clock_impl() {
        let state = shared();
        let t1 = Clock::now_ms(&*state);
        std::thread::sleep(std::time::Duration::from_millis(10));
        let t2 = Clock::now_ms(&*state);
        assert!(t2 >= t1 + 5);
    }

    #[test]
    fn test_concurrent_commits() {
        let state = shared();
        let handles: Vec<_> = ["IO5", "IO18", "IO19", "IO21"]
            .into_iter()
            .map(|pin| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        state.with_panel(|panel| {
                            panel
                                .commit(pin, "GPIO", ConfigIntent::gpio(GpioDirection::Output))
                                .unwrap();
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.status().configured_pins, 4);
        assert_eq!(state.dashboard().len(), 4);
    }
}
