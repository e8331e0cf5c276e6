//! Lifecycle events: types and broadcast bus.
//!
//! The supervisor reports every state transition as an [`Event`] on a [`Bus`].
//! Logging, readiness probes and tests consume them; the supervisor never waits on them.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
