//! # LogWriter: lifecycle events as leveled `tracing` records.
//!
//! The sink (console, file, rotating file, JSON) is whatever `tracing` subscriber the
//! host process installs; this writer only picks the level and fields.
//!
//! | Event                                   | Level   |
//! |-----------------------------------------|---------|
//! | `ConnectStarting`                       | `debug` |
//! | `ConnectSucceeded`, `Disconnected`, shutdown, reset | `info` |
//! | `ConnectFailed`, `RetryScheduled`, `ConnectRejected`, subscriber overflow | `warn` |
//! | `RetriesExhausted`, `SubscriberPanicked`| `error` |

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that logs every lifecycle event through `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let target = e.target.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::ConnectStarting => {
                debug!(target_id = target, attempt = e.attempt, "connecting");
            }
            EventKind::ConnectSucceeded => {
                info!(target_id = target, attempt = e.attempt, "connected");
            }
            EventKind::ConnectFailed => {
                warn!(target_id = target, attempt = e.attempt, error = reason, "connect failed");
            }
            EventKind::ConnectRejected => {
                warn!(target_id = target, attempt = e.attempt, reason, "connect rejected");
            }
            EventKind::RetryScheduled => {
                warn!(
                    target_id = target,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    error = reason,
                    "retry scheduled"
                );
            }
            EventKind::RetryCancelled => {
                info!(target_id = target, attempt = e.attempt, reason, "retry cancelled");
            }
            EventKind::RetriesExhausted => {
                error!(
                    target_id = target,
                    attempts = e.attempt,
                    error = reason,
                    "retries exhausted; datastore unavailable"
                );
            }
            EventKind::AttemptsReset => {
                info!(target_id = target, previous = e.attempt, "attempts reset");
            }
            EventKind::ShutdownRequested => info!(target_id = target, "shutdown requested"),
            EventKind::Disconnected => {
                info!(target_id = target, error = reason, "disconnected");
            }
            EventKind::ShutdownCompleted => info!(target_id = target, "shutdown completed"),
            EventKind::SubscriberOverflow => {
                warn!(subscriber = target, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = target, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
