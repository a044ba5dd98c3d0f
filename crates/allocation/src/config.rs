use std::time::Duration;

/// Coordinator tuning.
///
/// `allocate` waits for a concurrent allocation of the same complaint by retrying the
/// claim with exponential backoff: `retry_backoff * 2^attempt`, capped at `max_backoff`.
/// After `max_lock_attempts` failed claims it gives up with `ConcurrencyConflict`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub max_lock_attempts: u32,
    pub retry_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_lock_attempts: 8,
            retry_backoff: Duration::from_millis(2),
            max_backoff: Duration::from_millis(50),
        }
    }
}

impl CoordinatorConfig {
    /// Delay to sleep after the failed claim number `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }

    /// Claim attempts actually made; at least one.
    pub fn attempts(&self) -> u32 {
        self.max_lock_attempts.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(2));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(4));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(32));
        assert_eq!(config.delay_for_attempt(5), Duration::from_millis(50));
        assert_eq!(config.delay_for_attempt(40), Duration::from_millis(50));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let config = CoordinatorConfig {
            max_lock_attempts: 0,
            ..CoordinatorConfig::default()
        };
        assert_eq!(config.attempts(), 1);
    }
}
