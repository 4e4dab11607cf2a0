//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test doubles for desktop development and tests
//! - `ws`: WebSocket link to a real ESP32 (requires `ws` feature)

pub mod mock;

#[cfg(feature = "ws")]
pub mod ws;

pub use mock::*;

#[cfg(feature = "ws")]
pub use ws::*;
