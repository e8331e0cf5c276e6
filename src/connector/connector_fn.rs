//! # Function-backed connector (`ConnectorFn`)
//!
//! [`ConnectorFn`] wraps a closure `F: Fn(ConnectConfig) -> Fut`, producing a fresh
//! future per attempt. Shared state between attempts goes in an `Arc` captured by the closure.
//!
//! ## Example
//! ```rust
//! use connvisor::{ConnectConfig, ConnectError, ConnectorFn, TcpConnection};
//!
//! let refuse = ConnectorFn::new(|cfg: ConnectConfig| async move {
//!     Err::<TcpConnection, _>(ConnectError::transient(cfg.target(), "maintenance window"))
//! });
//! # let _ = refuse;
//! ```

use std::future::Future;

use async_trait::async_trait;

use crate::config::ConnectConfig;
use crate::connector::{Connection, Connector};
use crate::error::ConnectError;

/// Function-backed connector.
#[derive(Debug, Clone)]
pub struct ConnectorFn<F> {
    f: F,
}

impl<F> ConnectorFn<F> {
    /// Wraps `f`; it is called once per attempt with a copy of the config.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut, C> Connector for ConnectorFn<F>
where
    F: Fn(ConnectConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, ConnectError>> + Send + 'static,
    C: Connection,
{
    type Connection = C;

    async fn connect(&self, cfg: &ConnectConfig) -> Result<C, ConnectError> {
        (self.f)(cfg.clone()).await
    }
}
