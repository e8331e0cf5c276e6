//! Retry policies.
//!
//! This module groups the knobs that control **whether** a failed connect is retried
//! and **how long** to wait before the next attempt.
//!
//! ## Contents
//! - [`RetryPolicy`]   the retry budget (attempt cap)
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  optional randomization of the delay
//!
//! ## Quick wiring
//! ```text
//! SupervisorConfig { retry: RetryPolicy, backoff: BackoffPolicy, .. }
//!      └─► core::supervisor::ConnectionSupervisor uses:
//!           - retry.allows_retry(attempt) to decide schedule/exhaust
//!           - backoff.next(attempt - 1) as the timer delay
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → max_attempts=10.
//! - `BackoffPolicy::default()` → first=5s, factor=1.0, max=5s, jitter=None (fixed delay).

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
