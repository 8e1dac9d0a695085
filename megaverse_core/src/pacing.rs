//! Pacing policy for remote mutations.

use std::time::Duration;

/// Fixed-rate pacing: at most `requests` mutations per `per`.
///
/// The driver waits [`delay`](Self::delay) after every mutation, whether it
/// succeeded or failed. The remote answers 429 above its quota, so a failed
/// call still counts against the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Mutations allowed per window (0 is treated as 1)
    pub requests: u32,

    /// Window length
    pub per: Duration,
}

impl PacingPolicy {
    /// `requests` mutations per `per`.
    pub fn new(requests: u32, per: Duration) -> Self {
        Self { requests, per }
    }

    /// One mutation every `interval`.
    pub fn every(interval: Duration) -> Self {
        Self::new(1, interval)
    }

    /// No waiting between mutations.
    pub fn none() -> Self {
        Self::every(Duration::ZERO)
    }

    /// Wait inserted after each mutation.
    pub fn delay(&self) -> Duration {
        self.per / self.requests.max(1)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::every(Duration::from_secs(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_per_three_seconds() {
        assert_eq!(PacingPolicy::default().delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_delay_divides_window() {
        let policy = PacingPolicy::new(4, Duration::from_secs(2));
        assert_eq!(policy.delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_zero_requests_does_not_panic() {
        let policy = PacingPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.delay(), Duration::from_secs(1));
        assert_eq!(PacingPolicy::none().delay(), Duration::ZERO);
    }
}
