//! # ConnectionSupervisor: one datastore connection, bounded retries, clean shutdown.
//!
//! The supervisor owns a single [`State`] behind a mutex. Every transition (attempt,
//! retry, reset, shutdown) happens with that mutex held, so concurrent `connect()` calls
//! and the retry timer never overlap.
//!
//! ## Attempt flow
//! ```text
//! connect() / timer fires
//!   ├─ shutdown begun?          ─► ConnectRejected, false
//!   ├─ already connected?       ─► true
//!   ├─ attempt >= max_attempts? ─► ConnectRejected, false   (attempt not incremented)
//!   ├─ publish ConnectStarting
//!   ├─ connector.connect(cfg)   (raced against the shutdown token, optional timeout)
//!   │     ├─ Ok  ─► Connected, ConnectSucceeded, true
//!   │     └─ Err ─► attempt += 1, ConnectFailed
//!   │               ├─ attempt < max ─► arm timer(backoff), RetryScheduled, false
//!   │               └─ otherwise     ─► Exhausted, RetriesExhausted, false
//! ```
//!
//! ## Retry timer
//! ```text
//! spawn(select! {
//!     sleep(delay)            ─► lock ─► token still live? ─► attempt
//!     child_token.cancelled() ─► exit
//! })
//! ```
//! The timer holds a `Weak` reference: dropping the last supervisor handle cancels it.
//!
//! ## Shutdown
//! ```text
//! shutdown()
//!   ├─ cancel shutdown token   (before locking: aborts an attempt in flight, stops timers)
//!   ├─ lock
//!   ├─ already ShutDown?       ─► return
//!   ├─ cancel pending timer    ─► RetryCancelled
//!   ├─ close connection once   ─► Disconnected
//!   └─ phase = ShutDown        ─► ShutdownCompleted
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use connvisor::{ConnectConfig, ConnectionSupervisor, SupervisorConfig, TcpConnector};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = ConnectConfig::from_env()?;
//!     let sup = ConnectionSupervisor::new(TcpConnector::default(), target, SupervisorConfig::default());
//!
//!     // Connects (retrying in the background), waits for SIGINT/SIGTERM, then shuts down.
//!     sup.run_until_signal().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, broadcast, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::{ConnectConfig, SupervisorConfig};
use crate::connector::{Connection, Connector};
use crate::core::builder::SupervisorBuilder;
use crate::core::shutdown;
use crate::core::state::{PendingRetry, Phase, State, Status};
use crate::error::{ConnectError, SupervisorError};
use crate::events::{Bus, Event, EventKind};

pub(crate) struct Inner<C: Connector> {
    pub(crate) cfg: SupervisorConfig,
    pub(crate) connect_cfg: ConnectConfig,
    pub(crate) target: Arc<str>,
    pub(crate) connector: C,
    pub(crate) bus: Bus,
    /// Cancelled once shutdown begins; parent of every retry timer token.
    pub(crate) shutdown: CancellationToken,
    /// Cancelled when the last handle is dropped; stops the subscriber listener.
    pub(crate) dropped: CancellationToken,
    pub(crate) status: watch::Sender<Status>,
    pub(crate) state: Mutex<State<C::Connection>>,
}

impl<C: Connector> Drop for Inner<C> {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.dropped.cancel();
    }
}

/// Supervises the lifecycle of one datastore connection.
///
/// Cheap to clone; all clones share one state. See the [module docs](self) for the flow.
pub struct ConnectionSupervisor<C: Connector> {
    inner: Arc<Inner<C>>,
}

impl<C: Connector> Clone for ConnectionSupervisor<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> ConnectionSupervisor<C> {
    /// Creates a supervisor without subscribers. Does not need a running runtime.
    pub fn new(connector: C, connect_cfg: ConnectConfig, cfg: SupervisorConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self::from_parts(connector, connect_cfg, cfg, bus)
    }

    /// Starts a builder (for attaching subscribers such as [`LogWriter`](crate::LogWriter)).
    pub fn builder(connector: C, connect_cfg: ConnectConfig) -> SupervisorBuilder<C> {
        SupervisorBuilder::new(connector, connect_cfg)
    }

    pub(crate) fn from_parts(
        connector: C,
        connect_cfg: ConnectConfig,
        cfg: SupervisorConfig,
        bus: Bus,
    ) -> Self {
        let (status, _) = watch::channel(Status::initial(cfg.retry.limit()));
        let inner = Inner {
            target: connect_cfg.target().into(),
            cfg,
            connect_cfg,
            connector,
            bus,
            shutdown: CancellationToken::new(),
            dropped: CancellationToken::new(),
            status,
            state: Mutex::new(State::new()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub(crate) fn inner(&self) -> &Arc<Inner<C>> {
        &self.inner
    }

    /// Credential-free identity of the datastore target.
    pub fn target(&self) -> &str {
        &self.inner.target
    }

    /// Runtime settings this supervisor was built with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.inner.cfg
    }

    /// Receiver for lifecycle events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Current status snapshot. Never waits for an attempt in progress.
    pub fn status(&self) -> Status {
        *self.inner.status.borrow()
    }

    /// Receiver that observes every status change (for readiness probes).
    pub fn watch_status(&self) -> watch::Receiver<Status> {
        self.inner.status.subscribe()
    }

    /// `Ok(())` when connected; otherwise why the datastore is unavailable.
    pub fn readiness(&self) -> Result<(), SupervisorError> {
        self.status().readiness()
    }

    /// True while a connection is live.
    pub fn is_connected(&self) -> bool {
        self.status().connected
    }

    /// Attempts to connect now; returns the outcome of **this** attempt only.
    ///
    /// On failure a retry is scheduled in the background (budget permitting) and
    /// `false` is returned immediately. A retry that is already pending is superseded.
    /// After the budget is spent, calls return `false` without counting another attempt.
    pub async fn connect(&self) -> bool {
        let mut st = self.inner.state.lock().await;
        if self.refuse(&st) {
            return false;
        }
        if st.connection.is_some() {
            return true;
        }
        if let Some(pending) = st.pending.take() {
            pending.cancel();
            self.publish(
                self.event(EventKind::RetryCancelled)
                    .with_attempt(st.attempt)
                    .with_reason("superseded"),
            );
        }
        self.attempt(&mut st).await
    }

    /// Zeroes the attempt counter so an exhausted supervisor can try again.
    ///
    /// Does not connect by itself. No-op once shutdown began.
    pub async fn reset(&self) {
        let mut st = self.inner.state.lock().await;
        if self.shutting_down(&st) {
            return;
        }
        let previous = st.attempt;
        st.attempt = 0;
        if st.phase == Phase::Exhausted {
            st.phase = Phase::Init;
        }
        self.sync_status(&st);
        self.publish(self.event(EventKind::AttemptsReset).with_attempt(previous));
    }

    /// Cancels any pending retry, closes the connection and makes the supervisor terminal.
    ///
    /// Idempotent. Once it returns, no retry fires and no state changes.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();

        let mut st = self.inner.state.lock().await;
        if st.phase == Phase::ShutDown {
            return;
        }
        self.publish(self.event(EventKind::ShutdownRequested));

        if let Some(pending) = st.pending.take() {
            pending.cancel();
            self.publish(
                self.event(EventKind::RetryCancelled)
                    .with_attempt(st.attempt)
                    .with_reason("shutdown"),
            );
        }
        if let Some(mut conn) = st.connection.take() {
            let ev = match conn.close().await {
                Ok(()) => self.event(EventKind::Disconnected),
                Err(e) => self.event(EventKind::Disconnected).with_reason(e.to_string()),
            };
            self.publish(ev);
        }

        st.phase = Phase::ShutDown;
        self.sync_status(&st);
        self.publish(self.event(EventKind::ShutdownCompleted));
    }

    /// Connects, waits for `stop`, then shuts down.
    pub async fn run_until<F>(&self, stop: F)
    where
        F: Future<Output = ()>,
    {
        self.connect().await;
        stop.await;
        self.shutdown().await;
    }

    /// Connects, waits for SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere), then shuts down.
    ///
    /// Shutdown also runs when the signal listener cannot be registered; that error is returned.
    pub async fn run_until_signal(&self) -> std::io::Result<()> {
        self.connect().await;
        let res = shutdown::wait_for_shutdown_signal().await;
        self.shutdown().await;
        res
    }

    /// Runs one attempt. Caller holds the state lock and has done the refusal checks.
    async fn attempt(&self, st: &mut State<C::Connection>) -> bool {
        st.phase = Phase::Connecting;
        self.sync_status(st);
        let number = st.attempt.saturating_add(1);
        self.publish(self.event(EventKind::ConnectStarting).with_attempt(number));

        let res = tokio::select! {
            biased;
            _ = self.inner.shutdown.cancelled() => Err(ConnectError::ShutdownInProgress),
            res = self.dial() => res,
        };

        match res {
            Ok(conn) => {
                st.connection = Some(conn);
                st.phase = Phase::Connected;
                self.sync_status(st);
                self.publish(self.event(EventKind::ConnectSucceeded).with_attempt(number));
                true
            }
            // Aborted by shutdown: not a failed attempt; shutdown() finalizes the phase.
            Err(ConnectError::ShutdownInProgress) => {
                self.publish(
                    self.event(EventKind::ConnectRejected)
                        .with_attempt(st.attempt)
                        .with_reason("shutdown in progress"),
                );
                false
            }
            Err(err) => {
                st.attempt = number;
                let reason: Arc<str> = err.to_string().into();
                self.publish(
                    self.event(EventKind::ConnectFailed)
                        .with_attempt(number)
                        .with_reason(Arc::clone(&reason)),
                );

                if self.inner.cfg.retry.allows_retry(number) {
                    self.schedule(st, reason);
                } else {
                    st.phase = Phase::Exhausted;
                    self.sync_status(st);
                    self.publish(
                        self.event(EventKind::RetriesExhausted)
                            .with_attempt(number)
                            .with_reason(reason),
                    );
                }
                false
            }
        }
    }

    async fn dial(&self) -> Result<C::Connection, ConnectError> {
        let fut = self.inner.connector.connect(&self.inner.connect_cfg);
        match self.inner.cfg.attempt_timeout() {
            None => fut.await,
            Some(limit) => match time::timeout(limit, fut).await {
                Ok(res) => res,
                Err(_elapsed) => Err(ConnectError::Timeout {
                    target: self.target().to_string(),
                    timeout: limit,
                }),
            },
        }
    }

    /// Arms the single retry timer.
    fn schedule(&self, st: &mut State<C::Connection>, reason: Arc<str>) {
        if let Some(stale) = st.pending.take() {
            stale.cancel();
        }

        let delay = self.inner.cfg.backoff.next(st.attempt.saturating_sub(1));
        let token = self.inner.shutdown.child_token();
        let timer = token.clone();
        let weak: Weak<Inner<C>> = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = timer.cancelled() => return,
            }
            if let Some(inner) = weak.upgrade() {
                ConnectionSupervisor { inner }.fire(&timer).await;
            }
        });

        st.pending = Some(PendingRetry::new(token, handle));
        st.phase = Phase::RetryScheduled;
        self.sync_status(st);
        self.publish(
            self.event(EventKind::RetryScheduled)
                .with_attempt(st.attempt)
                .with_delay(delay)
                .with_reason(reason),
        );
    }

    /// Timer path: runs the retry unless the timer was cancelled or superseded meanwhile.
    async fn fire(&self, timer: &CancellationToken) {
        let mut st = self.inner.state.lock().await;
        if timer.is_cancelled() || self.shutting_down(&st) {
            return;
        }
        // A live token means this timer is still the pending one.
        st.pending = None;
        self.attempt(&mut st).await;
    }

    /// Publishes `ConnectRejected` and returns true when no attempt may run.
    fn refuse(&self, st: &State<C::Connection>) -> bool {
        let reason = if self.shutting_down(st) {
            ConnectError::ShutdownInProgress.to_string()
        } else if st.connection.is_none() && self.inner.cfg.retry.is_exhausted(st.attempt) {
            SupervisorError::Exhausted {
                attempts: st.attempt,
            }
            .to_string()
        } else {
            return false;
        };
        self.publish(
            self.event(EventKind::ConnectRejected)
                .with_attempt(st.attempt)
                .with_reason(reason),
        );
        true
    }

    fn shutting_down(&self, st: &State<C::Connection>) -> bool {
        st.phase == Phase::ShutDown || self.inner.shutdown.is_cancelled()
    }

    fn sync_status(&self, st: &State<C::Connection>) {
        self.inner
            .status
            .send_replace(st.snapshot(self.inner.cfg.retry.limit()));
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_target(Arc::clone(&self.inner.target))
    }

    fn publish(&self, ev: Event) {
        self.inner.bus.publish(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorFn;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Conn;

    #[async_trait]
    impl Connection for Conn {
        async fn close(&mut self) -> Result<(), ConnectError> {
            Ok(())
        }
    }

    fn failing(
        calls: Arc<AtomicUsize>,
    ) -> impl Connector<Connection = Conn> {
        ConnectorFn::new(move |cfg: ConnectConfig| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err::<Conn, _>(ConnectError::transient(cfg.target(), "refused")) }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_arms_one_timer_and_returns_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sup = ConnectionSupervisor::new(
            failing(calls.clone()),
            ConnectConfig::new("mongodb://db"),
            SupervisorConfig::fixed(10, Duration::from_secs(5)),
        );

        assert!(!sup.connect().await);
        let st = sup.status();
        assert_eq!(st.phase, Phase::RetryScheduled);
        assert_eq!(st.attempt, 1);
        assert!(st.retry_pending);
        assert!(!st.connected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_connect_supersedes_pending_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sup = ConnectionSupervisor::new(
            failing(calls.clone()),
            ConnectConfig::new("mongodb://db"),
            SupervisorConfig::fixed(10, Duration::from_secs(5)),
        );
        let mut rx = sup.subscribe();

        assert!(!sup.connect().await);
        time::sleep(Duration::from_secs(1)).await;
        assert!(!sup.connect().await);
        assert_eq!(sup.status().attempt, 2);

        // Only the second timer may fire: one retry at t=6s, none at t=5s.
        time::sleep(Duration::from_millis(4500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let mut cancelled = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::RetryCancelled {
                assert_eq!(ev.reason.as_deref(), Some("superseded"));
                cancelled += 1;
            }
        }
        assert_eq!(cancelled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout_counts_as_failure() {
        let connector = ConnectorFn::new(|_cfg: ConnectConfig| async {
            time::sleep(Duration::from_secs(60)).await;
            Ok::<_, ConnectError>(Conn)
        });
        let mut cfg = SupervisorConfig::fixed(1, Duration::from_secs(5));
        cfg.connect_timeout = Duration::from_secs(2);
        let sup = ConnectionSupervisor::new(connector, ConnectConfig::new("mongodb://slow"), cfg);
        let mut rx = sup.subscribe();

        assert!(!sup.connect().await);
        assert_eq!(sup.status().phase, Phase::Exhausted);

        let failed = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::ConnectFailed)
            .unwrap();
        assert!(failed.reason.unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_attempt_in_flight() {
        let connector = ConnectorFn::new(|_cfg: ConnectConfig| async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, ConnectError>(Conn)
        });
        let sup = ConnectionSupervisor::new(
            connector,
            ConnectConfig::new("mongodb://hang"),
            SupervisorConfig::default(),
        );

        let attempt = tokio::spawn({
            let sup = sup.clone();
            async move { sup.connect().await }
        });
        time::sleep(Duration::from_millis(10)).await;
        sup.shutdown().await;

        assert!(!attempt.await.unwrap());
        let st = sup.status();
        assert_eq!(st.phase, Phase::ShutDown);
        assert_eq!(st.attempt, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_last_handle_cancels_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sup = ConnectionSupervisor::new(
            failing(calls.clone()),
            ConnectConfig::new("mongodb://db"),
            SupervisorConfig::fixed(10, Duration::from_secs(5)),
        );
        assert!(!sup.connect().await);
        drop(sup);

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
