//! # Connector and connection traits.

use async_trait::async_trait;

use crate::config::ConnectConfig;
use crate::error::ConnectError;

/// # Opens connections to a datastore.
///
/// One call is one attempt. Implementations should bound their own waiting
/// (e.g. with `server_selection_timeout`); the supervisor can add an outer timeout via
/// [`SupervisorConfig::connect_timeout`](crate::SupervisorConfig::connect_timeout).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use connvisor::{ConnectConfig, ConnectError, Connection, Connector};
///
/// struct Session;
///
/// #[async_trait]
/// impl Connection for Session {
///     async fn close(&mut self) -> Result<(), ConnectError> { Ok(()) }
/// }
///
/// struct Driver;
///
/// #[async_trait]
/// impl Connector for Driver {
///     type Connection = Session;
///
///     async fn connect(&self, cfg: &ConnectConfig) -> Result<Session, ConnectError> {
///         if cfg.uri.is_empty() {
///             return Err(ConnectError::transient(cfg.target(), "empty uri"));
///         }
///         Ok(Session)
///     }
/// }
/// ```
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Live connection handle produced on success.
    type Connection: Connection;

    /// Performs one connect attempt.
    async fn connect(&self, cfg: &ConnectConfig) -> Result<Self::Connection, ConnectError>;
}

/// # A live datastore connection.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Releases the connection. Called at most once, during shutdown.
    async fn close(&mut self) -> Result<(), ConnectError>;
}
