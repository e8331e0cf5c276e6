//! # Configuration.
//!
//! Two structs, both plain data with `Default`:
//! - [`ConnectConfig`] : the datastore target and driver knobs. The supervisor treats it
//!   as opaque and hands it to the [`Connector`](crate::Connector) unchanged.
//! - [`SupervisorConfig`] : retry budget, backoff, event bus capacity and attempt timeout.
//!
//! ## Sentinel values
//! - `connect_timeout = 0s` → no per-attempt timeout
//! - `bus_capacity = 0` → clamped to 1

use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, RetryPolicy};

/// Environment variable holding the datastore URI.
pub const URI_VAR: &str = "MONGODB_URI";
/// Environment variable enabling TLS (`true`/`false`).
pub const TLS_VAR: &str = "MONGO_TLS";

/// Connection target and driver options.
///
/// Only `uri` identifies the target; the rest is passed through to the connector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectConfig {
    /// Connection string, e.g. `mongodb://user:pass@db:27017/app`.
    pub uri: String,
    /// Use TLS for the connection.
    pub tls: bool,
    /// Maximum connections in the driver pool.
    pub max_pool_size: u32,
    /// How long a connector may spend finding a server.
    pub server_selection_timeout: Duration,
    /// Socket inactivity timeout.
    pub socket_timeout: Duration,
    /// Driver heartbeat interval.
    pub heartbeat_frequency: Duration,
    /// Let the driver retry writes once.
    pub retry_writes: bool,
    /// Build indexes on connect (off: indexes are created by migrations).
    pub auto_index: bool,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            tls: false,
            max_pool_size: 20,
            server_selection_timeout: Duration::from_secs(5),
            socket_timeout: Duration::from_secs(45),
            heartbeat_frequency: Duration::from_secs(10),
            retry_writes: true,
            auto_index: false,
        }
    }
}

impl ConnectConfig {
    /// Default options pointed at `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Loads `uri` from `MONGODB_URI` and `tls` from `MONGO_TLS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ConnectConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = lookup(URI_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing { var: URI_VAR })?;

        let tls = match lookup(TLS_VAR).as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    var: TLS_VAR,
                    value: v.to_string(),
                });
            }
        };

        Ok(Self {
            uri: uri.trim().to_string(),
            tls,
            ..Self::default()
        })
    }

    /// Target identity safe for logs: the URI with any `user:password@` removed.
    pub fn target(&self) -> String {
        let (scheme, rest) = match self.uri.split_once("://") {
            Some((s, r)) => (Some(s), r),
            None => (None, self.uri.as_str()),
        };
        let (hosts, tail) = split_authority(rest);

        match scheme {
            Some(s) => format!("{s}://{hosts}{tail}"),
            None => format!("{hosts}{tail}"),
        }
    }
}

/// Splits `[userinfo@]hosts[/path][?query]` (scheme already removed) into hosts and tail.
///
/// Userinfo ends at the last `@`, so a password may carry unencoded `@`, `/` or `?`.
pub(crate) fn split_authority(rest: &str) -> (&str, &str) {
    let start = rest.rfind('@').map_or(0, |at| at + 1);
    let end = rest[start..]
        .find(['/', '?'])
        .map_or(rest.len(), |i| start + i);
    (&rest[start..end], &rest[end..])
}

/// Supervisor runtime settings.
///
/// ## Field semantics
/// - `retry`: attempt cap (default 10)
/// - `backoff`: delay between attempts (default fixed 5s)
/// - `bus_capacity`: event ring buffer size (min 1)
/// - `connect_timeout`: per-attempt timeout (`0s` = none)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Retry budget.
    pub retry: RetryPolicy,
    /// Delay between attempts.
    pub backoff: BackoffPolicy,
    /// Capacity of the event bus broadcast channel.
    ///
    /// Receivers lagging more than this many events skip the oldest ones.
    pub bus_capacity: usize,
    /// Per-attempt timeout applied around the connector call.
    pub connect_timeout: Duration,
}

impl Default for SupervisorConfig {
    /// - `retry = 10 attempts`
    /// - `backoff = fixed 5s`
    /// - `bus_capacity = 1024`
    /// - `connect_timeout = 0s` (the connector's own timeouts apply)
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            backoff: BackoffPolicy::default(),
            bus_capacity: 1024,
            connect_timeout: Duration::ZERO,
        }
    }
}

impl SupervisorConfig {
    /// Fixed-delay config with the given budget; handy for tests and small tools.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            retry: RetryPolicy::new(max_attempts),
            backoff: BackoffPolicy::fixed(delay),
            ..Self::default()
        }
    }

    /// Per-attempt timeout as an `Option` (`None` = no timeout).
    #[inline]
    pub fn attempt_timeout(&self) -> Option<Duration> {
        if self.connect_timeout == Duration::ZERO {
            None
        } else {
            Some(self.connect_timeout)
        }
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}
