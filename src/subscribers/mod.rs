//! # Event subscribers.
//!
//! [`Subscribe`] is the extension point for reacting to lifecycle [`Event`](crate::Event)s
//! without slowing the supervisor down. [`SubscriberSet`] fans events out to every
//! subscriber through its own bounded queue and worker task.
//!
//! ```text
//! Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                          ├──► [queue] ─► LogWriter::on_event()
//!                          └──► [queue] ─► Custom::on_event()
//! ```
//!
//! ## Implementing a subscriber
//! ```no_run
//! use async_trait::async_trait;
//! use connvisor::{Event, EventKind, Subscribe};
//!
//! struct Pager;
//!
//! #[async_trait]
//! impl Subscribe for Pager {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::RetriesExhausted {
//!             // page someone
//!         }
//!     }
//!     fn name(&self) -> &'static str { "pager" }
//! }
//! ```

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
