//! Trait definitions for the device link and time source.
//!
//! These abstractions let the panel run against a real WebSocket, or against
//! test doubles on a desktop without any device attached.
//!
//! # Submodules
//!
//! - `transport`: duplex text-frame link to the device
//! - `clock`: millisecond time source
//!
//! | Trait | Implementations |
//! |-------|-----------------|
//! | [`DeviceTransport`] | [`MockTransport`](crate::hal::MockTransport), `WsTransport` (`ws`) |
//! | [`Clock`] | [`MockClock`](crate::hal::MockClock), `SharedPanel` (services) |

pub mod clock;
pub mod transport;

pub use clock::*;
pub use transport::*;
