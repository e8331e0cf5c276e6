//! Error types used by the connection supervisor.
//!
//! This module defines three error enums:
//!
//! - [`ConnectError`]: the outcome of a single connect attempt.
//! - [`SupervisorError`]: the availability condition reported to readiness checks.
//! - [`ConfigError`]: problems loading [`ConnectConfig`](crate::ConnectConfig) from the environment.
//!
//! All of them provide `as_label` for logs/metrics. None of them is ever raised as a
//! process-terminating fault: connect failures end up as a `false` return plus an event.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a single connect attempt.
///
/// `Transient` and `Timeout` are retryable and feed the retry budget.
/// `ShutdownInProgress` means the attempt was rejected or aborted because shutdown began.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The datastore could not be reached or refused the session; a later attempt may succeed.
    #[error("connect to {target} failed: {error}")]
    Transient {
        /// Credential-free target identity.
        target: String,
        /// The underlying error message.
        error: String,
    },

    /// The attempt did not complete within the configured connect timeout.
    #[error("connect to {target} timed out after {timeout:?}")]
    Timeout {
        /// Credential-free target identity.
        target: String,
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// Shutdown already began; no attempt is made.
    #[error("shutdown in progress")]
    ShutdownInProgress,
}

impl ConnectError {
    /// Shorthand for a [`ConnectError::Transient`] built from any displayable error.
    pub fn transient(target: impl Into<String>, error: impl std::fmt::Display) -> Self {
        ConnectError::Transient {
            target: target.into(),
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use connvisor::ConnectError;
    ///
    /// let err = ConnectError::transient("db:27017", "connection refused");
    /// assert_eq!(err.as_label(), "connect_transient");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConnectError::Transient { .. } => "connect_transient",
            ConnectError::Timeout { .. } => "connect_timeout",
            ConnectError::ShutdownInProgress => "connect_shutdown_in_progress",
        }
    }

    /// Indicates whether another attempt may succeed.
    ///
    /// ```
    /// use connvisor::ConnectError;
    ///
    /// assert!(ConnectError::transient("db", "refused").is_retryable());
    /// assert!(!ConnectError::ShutdownInProgress.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConnectError::Transient { .. } | ConnectError::Timeout { .. }
        )
    }
}

/// # Availability conditions reported by [`ConnectionSupervisor::readiness`](crate::ConnectionSupervisor::readiness).
///
/// None of these stop the process; a readiness collaborator decides how to react.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// The retry budget is spent; the datastore stays unavailable until `reset()` or restart.
    #[error("retries exhausted after {attempts} attempts")]
    Exhausted {
        /// Failed attempts counted so far.
        attempts: u32,
    },

    /// Shutdown began; the supervisor will not connect again.
    #[error("shutdown in progress")]
    ShutdownInProgress,

    /// Not connected yet, but attempts remain (initial or retry pending).
    #[error("datastore unavailable (attempt {attempt})")]
    Unavailable {
        /// Failed attempts counted so far.
        attempt: u32,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::Exhausted { .. } => "supervisor_exhausted",
            SupervisorError::ShutdownInProgress => "supervisor_shutdown",
            SupervisorError::Unavailable { .. } => "supervisor_unavailable",
        }
    }
}

/// # Errors loading configuration from the environment.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set (or is empty).
    #[error("missing environment variable {var}")]
    Missing {
        /// Variable name.
        var: &'static str,
    },

    /// A variable is set but cannot be interpreted.
    #[error("invalid value {value:?} for {var}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value found.
        value: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Missing { .. } => "config_missing",
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}
