//! # Retry budget.
//!
//! [`RetryPolicy`] caps how many failed connect attempts the supervisor tolerates
//! before it stops scheduling retries and reports the datastore as exhausted.
//!
//! ```text
//! attempt 1 fails ─► 1 < max ─► schedule retry
//! ...
//! attempt max fails ─► max < max is false ─► Exhausted (no timer)
//! ```

/// Attempt cap for connect retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total failed attempts allowed (`0` behaves like `1`: the first failure exhausts).
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    /// Returns a budget of 10 attempts.
    fn default() -> Self {
        Self { max_attempts: 10 }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt cap.
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Attempt cap clamped to a minimum of 1.
    #[inline]
    pub fn limit(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether a retry may be scheduled after `failed` attempts have failed.
    #[inline]
    pub fn allows_retry(&self, failed: u32) -> bool {
        failed < self.limit()
    }

    /// Whether the budget is spent after `failed` attempts.
    #[inline]
    pub fn is_exhausted(&self, failed: u32) -> bool {
        !self.allows_retry(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_nine_retries() {
        let policy = RetryPolicy::default();
        for failed in 0..10 {
            assert_eq!(policy.allows_retry(failed), failed < 10, "failed={failed}");
        }
        assert!(policy.is_exhausted(10));
        assert!(policy.is_exhausted(11));
    }

    #[test]
    fn test_zero_is_clamped_to_one() {
        let policy = RetryPolicy::new(0);
        assert_eq!(policy.limit(), 1);
        assert!(policy.allows_retry(0));
        assert!(policy.is_exhausted(1));
    }
}
