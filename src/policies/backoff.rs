//! # Backoff policy between connect attempts.
//!
//! [`BackoffPolicy`] computes the delay before the next connect attempt.
//! It is parameterized by:
//! - [`BackoffPolicy::first`] the delay before the first retry;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the delay cap.
//!
//! The default is a **fixed** delay: `first = max = 5s`, `factor = 1.0`.
//! The delay for retry index `n` is `first × factor^n`, clamped to `max`, then jittered.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use connvisor::{BackoffPolicy, JitterPolicy};
//!
//! let fixed = BackoffPolicy::fixed(Duration::from_secs(5));
//! assert_eq!(fixed.next(0), Duration::from_secs(5));
//! assert_eq!(fixed.next(7), Duration::from_secs(5));
//!
//! let growing = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//! assert_eq!(growing.next(1), Duration::from_millis(200));
//! assert_eq!(growing.next(10), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Delay policy for connect retries.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Multiplicative growth factor (`1.0` = fixed delay).
    pub factor: f64,
    /// Optional randomization.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Fixed 5s delay, no jitter.
    fn default() -> Self {
        Self::fixed(Duration::from_secs(5))
    }
}

impl BackoffPolicy {
    /// A constant delay with no jitter.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay for retry index `retry` (0-indexed).
    ///
    /// Non-finite or negative intermediate values clamp to [`BackoffPolicy::max`].
    pub fn next(&self, retry: u32) -> Duration {
        let exp = retry.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}
