//! Supervisor core: connection lifecycle and shutdown.
//!
//! Internal modules:
//! - [`supervisor`]: connect / retry / reset / shutdown on one owned state object;
//! - [`builder`]: wires config, bus and subscribers;
//! - [`state`]: phase machine, status snapshot, pending retry handle;
//! - [`shutdown`]: cross-platform termination signal.

mod builder;
mod shutdown;
mod state;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use shutdown::wait_for_shutdown_signal;
pub use state::{Phase, Status};
pub use supervisor::ConnectionSupervisor;
