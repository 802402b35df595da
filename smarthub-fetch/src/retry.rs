//! Retry policy for pending usage reports.

use std::time::Duration;

/// Default number of poll attempts per fetch.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay between poll attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Strategy for re-polling while the portal reports `PENDING`.
///
/// Only the pending status is retried. HTTP and transport errors fail the
/// fetch immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy {
    /// Maximum number of poll requests, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl RetryStrategy {
    /// Creates a strategy with the given attempt budget and the default delay.
    ///
    /// A budget of zero is raised to one: the first poll is always sent.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: DEFAULT_DELAY,
        }
    }

    /// Sets the delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns true if another attempt may follow attempt number `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let strategy = RetryStrategy::default();

        assert_eq!(strategy.max_attempts, 5);
        assert_eq!(strategy.delay, Duration::from_secs(2));
    }

    #[test]
    fn test_should_retry() {
        let strategy = RetryStrategy::default();

        assert!(strategy.should_retry(1));
        assert!(strategy.should_retry(4));
        assert!(!strategy.should_retry(5));
        assert!(!strategy.should_retry(6));
    }

    #[test]
    fn test_zero_attempts_still_polls_once() {
        let strategy = RetryStrategy::new(0);
        assert_eq!(strategy.max_attempts, 1);
        assert!(!strategy.should_retry(1));
    }

    #[test]
    fn test_with_delay_keeps_budget() {
        let strategy = RetryStrategy::new(3).with_delay(Duration::from_millis(250));
        assert_eq!(strategy.max_attempts, 3);
        assert_eq!(strategy.delay, Duration::from_millis(250));
    }
}
