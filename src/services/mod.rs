//! Services that run the panel inside a tokio process.
//!
//! - `web` feature: Axum-based HTTP API with JSON endpoints
//! - `ws` feature: the WebSocket transport in [`crate::hal`]
//!
//! Both services use one process-wide [`SharedPanel`] wrapped in `Arc`:
//!
//! ```ignore
//! use std::sync::Arc;
//! use gpio_panel::services::{build_router, SharedPanel, SyncRunner};
//!
//! // Create single shared state
//! let state = Arc::new(SharedPanel::new(panel));
//!
//! // The runner polls the device channel, the router serves the API
//! let runner = SyncRunner::new(Arc::clone(&state), &config.sync);
//! let router = build_router(Arc::clone(&state), &web_config);
//! ```

// Shared state and the poll loop (available when either web or ws is enabled)
#[cfg(any(feature = "web", feature = "ws"))]
pub mod shared;

#[cfg(any(feature = "web", feature = "ws"))]
pub mod runner;

#[cfg(feature = "web")]
pub mod api;

#[cfg(feature = "web")]
pub mod web;

// Re-exports
#[cfg(any(feature = "web", feature = "ws"))]
pub use shared::*;

#[cfg(any(feature = "web", feature = "ws"))]
pub use runner::*;

#[cfg(feature = "web")]
pub use api::*;

#[cfg(feature = "web")]
pub use web::*;
