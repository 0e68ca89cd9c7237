//! Per-step retry budget.

use std::time::Duration;

/// Default attempts per step.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Default pause between attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Bounded attempts for one logical step, with a fixed backoff.
///
/// `limit` counts attempts, not retries: a step with limit 5 is exhausted by
/// its fifth consecutive failure.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    limit: u32,
    remaining: u32,
    backoff: Duration,
}

impl RetryBudget {
    pub fn new(limit: u32, backoff: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            remaining: limit,
            backoff,
        }
    }

    /// Restore the full budget for a new step.
    pub fn reset(&mut self) {
        self.remaining = self.limit;
    }

    /// Record a failed attempt. Returns true when the budget is exhausted.
    pub fn record_failure(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Failed attempts since the last reset.
    pub fn failures(&self) -> u32 {
        self.limit - self.remaining
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_LIMIT, DEFAULT_RETRY_BACKOFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let budget = RetryBudget::default();
        assert_eq!(budget.limit(), 5);
        assert_eq!(budget.remaining(), 5);
        assert_eq!(budget.backoff(), Duration::from_millis(500));
    }

    #[test]
    fn test_exhausted_after_limit_failures() {
        let mut budget = RetryBudget::new(3, Duration::ZERO);
        assert!(!budget.record_failure());
        assert!(!budget.record_failure());
        assert!(budget.record_failure());
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.failures(), 3);
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut budget = RetryBudget::new(2, Duration::ZERO);
        budget.record_failure();
        budget.reset();
        assert_eq!(budget.remaining(), 2);
        assert_eq!(budget.failures(), 0);
    }

    #[test]
    fn test_zero_limit_allows_one_attempt() {
        let mut budget = RetryBudget::new(0, Duration::ZERO);
        assert_eq!(budget.limit(), 1);
        assert!(budget.record_failure());
    }
}
