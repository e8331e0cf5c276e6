//! # Lifecycle events emitted by the connection supervisor.
//!
//! The [`EventKind`] enum classifies events in three groups:
//! - **Attempt events**: one connect attempt and its outcome
//! - **Retry events**: scheduling, cancelling and exhausting retries
//! - **Shutdown events**: teardown of the connection and timers
//!
//! The [`Event`] struct carries the metadata: sequence number, timestamp, target,
//! attempt number, delay and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each event gets a process-wide, monotonically increasing `seq`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use connvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_target("mongodb://db:27017")
//!     .with_attempt(3)
//!     .with_delay(Duration::from_secs(5))
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.delay(), Some(Duration::from_secs(5)));
//! assert_eq!(ev.reason.as_deref(), Some("connection refused"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Attempt events ===
    /// A connect attempt is starting.
    ///
    /// Sets:
    /// - `target`: credential-free target
    /// - `attempt`: number of this attempt (1-based)
    ConnectStarting,

    /// The attempt succeeded; the connection is live.
    ///
    /// Sets:
    /// - `target`
    /// - `attempt`: number of the successful attempt
    ConnectSucceeded,

    /// The attempt failed.
    ///
    /// Sets:
    /// - `target`
    /// - `attempt`: failed attempts so far (including this one)
    /// - `reason`: underlying error
    ConnectFailed,

    /// A connect call was refused without trying (shutdown began or budget spent).
    ///
    /// Sets:
    /// - `target`
    /// - `attempt`: failed attempts so far
    /// - `reason`: why it was refused
    ConnectRejected,

    // === Retry events ===
    /// A retry timer was armed.
    ///
    /// Sets:
    /// - `target`
    /// - `attempt`: failed attempts so far
    /// - `delay_ms`: delay before the retry
    /// - `reason`: last failure message
    RetryScheduled,

    /// A pending retry timer was cancelled (shutdown or superseded by a manual connect).
    ///
    /// Sets:
    /// - `target`
    /// - `attempt`
    /// - `reason`: `"shutdown"` or `"superseded"`
    RetryCancelled,

    /// The retry budget is spent; no more timers will be armed.
    ///
    /// Sets:
    /// - `target`
    /// - `attempt`: final failed attempt count
    /// - `reason`: last failure message
    RetriesExhausted,

    /// The attempt counter was reset.
    ///
    /// Sets:
    /// - `target`
    /// - `attempt`: count before the reset
    AttemptsReset,

    // === Shutdown events ===
    /// Shutdown began (signal observed or `shutdown()` called).
    ShutdownRequested,

    /// The live connection was closed.
    ///
    /// Sets:
    /// - `target`
    /// - `reason`: close error, if closing failed
    Disconnected,

    /// Teardown finished; the supervisor is terminal.
    ShutdownCompleted,

    // === Subscriber events ===
    /// A subscriber panicked while handling an event.
    ///
    /// Sets:
    /// - `target`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `target`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,
}

/// Lifecycle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Datastore target (or subscriber name for subscriber events).
    pub target: Option<Arc<str>>,
    /// Attempt count.
    pub attempt: Option<u32>,
    /// Retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, cancel cause, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event with the current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            target: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a target identity.
    #[inline]
    pub fn with_target(mut self, target: impl Into<Arc<str>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Retry delay as a `Duration`, if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_target(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_target(subscriber)
            .with_reason(info)
    }
}
