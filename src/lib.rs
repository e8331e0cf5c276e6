//! # connvisor
//!
//! **connvisor** supervises the lifecycle of one connection to an external datastore.
//!
//! It connects, retries failures with a capped attempt count and a fixed backoff, keeps at
//! most one retry timer armed, and cancels that timer on shutdown so that no retry fires
//! after the process has started exiting.
//!
//! ## Architecture
//! ```text
//!   ConnectConfig ──┐      ┌── SupervisorConfig (RetryPolicy, BackoffPolicy, timeouts)
//!                   ▼      ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  ConnectionSupervisor                                     │
//! │  - Mutex<State>  (phase, attempt, pending timer, conn)    │
//! │  - shutdown CancellationToken (parent of timer tokens)    │
//! │  - watch<Status> (readiness snapshot)                     │
//! └──────┬──────────────────────┬─────────────────────┬───────┘
//!        │ connect()            │ publish(Event)      │ shutdown()
//!        ▼                      ▼                     ▼
//!   Connector::connect     Bus (broadcast) ──► SubscriberSet ──► LogWriter (tracing)
//!        │                                                     └─► custom subscribers
//!        ▼
//!   Connection::close (once, on shutdown)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Init ──► Connecting ──► Connected
//!              │    └───► RetryScheduled ──(after backoff)──► Connecting
//!              └────────► Exhausted ──(reset)──► Init
//! any ──(shutdown)──► ShutDown
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types                                  |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Supervision**   | Connect, bounded retry, reset, idempotent shutdown.      | [`ConnectionSupervisor`], [`Phase`], [`Status`] |
//! | **Connectors**    | Plug in any datastore driver.                            | [`Connector`], [`Connection`], [`ConnectorFn`], [`TcpConnector`] |
//! | **Policies**      | Retry budget, backoff and jitter.                        | [`RetryPolicy`], [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Events**        | Lifecycle events for logging/metrics.                    | [`Event`], [`EventKind`], [`Subscribe`], [`LogWriter`] |
//! | **Errors**        | Typed errors with stable labels.                         | [`ConnectError`], [`SupervisorError`], [`ConfigError`] |
//! | **Configuration** | Target options and runtime settings.                     | [`ConnectConfig`], [`SupervisorConfig`]    |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use connvisor::{
//!     ConnectConfig, ConnectError, ConnectionSupervisor, ConnectorFn, LogWriter, Phase,
//!     SupervisorConfig, TcpConnection,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let unreachable = ConnectorFn::new(|cfg: ConnectConfig| async move {
//!         Err::<TcpConnection, _>(ConnectError::transient(cfg.target(), "connection refused"))
//!     });
//!
//!     let sup = ConnectionSupervisor::builder(unreachable, ConnectConfig::new("mongodb://db:27017"))
//!         .with_config(SupervisorConfig::fixed(3, Duration::from_millis(10)))
//!         .with_subscriber(Arc::new(LogWriter::new()))
//!         .build();
//!
//!     assert!(!sup.connect().await);
//!     assert_eq!(sup.status().phase, Phase::RetryScheduled);
//!
//!     sup.shutdown().await;
//!     assert_eq!(sup.status().phase, Phase::ShutDown);
//! }
//! ```
mod config;
mod connector;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use config::{ConnectConfig, SupervisorConfig, TLS_VAR, URI_VAR};
pub use connector::{Connection, Connector, ConnectorFn, TcpConnection, TcpConnector};
pub use core::{ConnectionSupervisor, Phase, Status, SupervisorBuilder, wait_for_shutdown_signal};
pub use error::{ConfigError, ConnectError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
