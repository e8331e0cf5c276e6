//! # Connection state and its public snapshot.
//!
//! [`State`] is owned by one supervisor and lives behind its mutex. [`Status`] is the
//! copy that readers see through a `watch` channel, so health checks never wait on an attempt.
//!
//! ```text
//! Init ──► Connecting ──► Connected
//!              │    └───► RetryScheduled ──(timer)──► Connecting
//!              └────────► Exhausted ──(reset)──► Init
//! any ──(shutdown)──► ShutDown
//! ```

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SupervisorError;

/// Position in the connection state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No attempt made yet (or attempts were reset).
    Init,
    /// An attempt is in progress.
    Connecting,
    /// The connection is live.
    Connected,
    /// The last attempt failed and one retry timer is armed.
    RetryScheduled,
    /// The retry budget is spent; terminal until `reset()`.
    Exhausted,
    /// Shutdown completed; terminal.
    ShutDown,
}

impl Phase {
    /// Short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Connecting => "connecting",
            Phase::Connected => "connected",
            Phase::RetryScheduled => "retry_scheduled",
            Phase::Exhausted => "exhausted",
            Phase::ShutDown => "shut_down",
        }
    }
}

/// Point-in-time view of a supervisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// State machine position.
    pub phase: Phase,
    /// Failed attempts so far.
    pub attempt: u32,
    /// Retry budget.
    pub max_attempts: u32,
    /// A connection is live.
    pub connected: bool,
    /// A retry timer is armed.
    pub retry_pending: bool,
}

impl Status {
    pub(crate) fn initial(max_attempts: u32) -> Self {
        Self {
            phase: Phase::Init,
            attempt: 0,
            max_attempts,
            connected: false,
            retry_pending: false,
        }
    }

    /// Readiness verdict for this snapshot.
    ///
    /// ```
    /// use connvisor::{Phase, Status, SupervisorError};
    ///
    /// let st = Status { phase: Phase::Exhausted, attempt: 10, max_attempts: 10, connected: false, retry_pending: false };
    /// assert_eq!(st.readiness(), Err(SupervisorError::Exhausted { attempts: 10 }));
    /// ```
    pub fn readiness(&self) -> Result<(), SupervisorError> {
        match self.phase {
            Phase::Connected => Ok(()),
            Phase::ShutDown => Err(SupervisorError::ShutdownInProgress),
            Phase::Exhausted => Err(SupervisorError::Exhausted {
                attempts: self.attempt,
            }),
            Phase::Init | Phase::Connecting | Phase::RetryScheduled => {
                Err(SupervisorError::Unavailable {
                    attempt: self.attempt,
                })
            }
        }
    }
}

/// An armed retry timer.
///
/// The timer task selects on `token`; cancelling it is enough to stop the retry.
pub(crate) struct PendingRetry {
    token: CancellationToken,
    _handle: JoinHandle<()>,
}

impl PendingRetry {
    pub(crate) fn new(token: CancellationToken, handle: JoinHandle<()>) -> Self {
        Self {
            token,
            _handle: handle,
        }
    }

    /// Stops the timer. A timer that already fired re-checks its token under the lock.
    pub(crate) fn cancel(self) {
        self.token.cancel();
    }
}

/// Mutable connection state, owned by one supervisor.
pub(crate) struct State<T> {
    pub(crate) phase: Phase,
    pub(crate) attempt: u32,
    pub(crate) pending: Option<PendingRetry>,
    pub(crate) connection: Option<T>,
}

impl<T> State<T> {
    pub(crate) fn new() -> Self {
        Self {
            phase: Phase::Init,
            attempt: 0,
            pending: None,
            connection: None,
        }
    }

    pub(crate) fn snapshot(&self, max_attempts: u32) -> Status {
        Status {
            phase: self.phase,
            attempt: self.attempt,
            max_attempts,
            connected: self.connection.is_some(),
            retry_pending: self.pending.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let st: State<()> = State::new();
        assert_eq!(st.snapshot(10), Status::initial(10));
        assert_eq!(
            Status::initial(10).readiness(),
            Err(SupervisorError::Unavailable { attempt: 0 })
        );
    }

    #[test]
    fn test_readiness_per_phase() {
        let mut st = Status::initial(3);
        st.phase = Phase::Connected;
        st.connected = true;
        assert_eq!(st.readiness(), Ok(()));

        st.phase = Phase::ShutDown;
        st.connected = false;
        assert_eq!(st.readiness(), Err(SupervisorError::ShutdownInProgress));

        st.phase = Phase::RetryScheduled;
        st.attempt = 2;
        assert_eq!(
            st.readiness(),
            Err(SupervisorError::Unavailable { attempt: 2 })
        );
    }
}
