//! # Connector seam.
//!
//! The supervisor does not know how to talk to any particular datastore. It drives a
//! [`Connector`], which turns a [`ConnectConfig`](crate::ConnectConfig) into a live
//! [`Connection`], and closes that connection on shutdown.
//!
//! - [`Connector`] / [`Connection`]: the traits a driver adapter implements
//! - [`ConnectorFn`]: closure-backed connector, handy for adapters and tests
//! - [`TcpConnector`]: reachability probe that opens a TCP stream to the URI's first host

mod connector;
mod connector_fn;
mod tcp;

pub use connector::{Connection, Connector};
pub use connector_fn::ConnectorFn;
pub use tcp::{TcpConnection, TcpConnector};
