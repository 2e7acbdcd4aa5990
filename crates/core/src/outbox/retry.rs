//! Retry policy for outbox delivery.

use chrono::{DateTime, Duration, Utc};

/// Exponential backoff policy for failed deliveries.
///
/// The delay for attempt `n` (zero-based) is `base * 2^n`, capped at
/// `max_delay`. Once `max_retries` attempts have failed the event is
/// left terminally failed and no further automatic attempt is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    base_delay_secs: i64,
    max_delay_secs: i64,
    max_retries: i32,
}

/// Upper clamp for configured delays; keeps every computed delay well
/// inside `chrono::Duration` range.
const MAX_DELAY_SECS: i64 = 2_147_483_647;

impl RetryPolicy {
    /// Creates a retry policy. Out-of-range inputs are clamped: at
    /// least a 1s base and one attempt, at most `MAX_DELAY_SECS` for
    /// base and cap, and the cap never below the base.
    #[must_use]
    pub fn new(base_delay_secs: i64, max_delay_secs: i64, max_retries: i32) -> Self {
        let base = base_delay_secs.clamp(1, MAX_DELAY_SECS);
        Self {
            base_delay_secs: base,
            max_delay_secs: max_delay_secs.clamp(base, MAX_DELAY_SECS),
            max_retries: max_retries.max(1),
        }
    }

    /// Maximum automatic delivery attempts.
    #[must_use]
    pub const fn max_retries(&self) -> i32 {
        self.max_retries
    }

    /// Returns true once an event has exhausted its automatic retries.
    #[must_use]
    pub const fn is_exhausted(&self, retry_count: i32) -> bool {
        retry_count >= self.max_retries
    }

    /// The backoff delay after `retry_count` failed attempts.
    #[must_use]
    pub fn backoff_delay(&self, retry_count: i32) -> Duration {
        // The shift is clamped and the multiply saturates, so the cap
        // always applies even for extreme bases or retry counts.
        let exponent = retry_count.clamp(0, 32) as u32;
        let secs = self
            .base_delay_secs
            .saturating_mul(1_i64 << exponent)
            .min(self.max_delay_secs);
        Duration::seconds(secs)
    }

    /// The next eligibility time for an event after a failed attempt.
    #[must_use]
    pub fn next_available_at(&self, now: DateTime<Utc>, retry_count: i32) -> DateTime<Utc> {
        now + self.backoff_delay(retry_count)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(30, 3600, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 30)]
    #[case(1, 60)]
    #[case(2, 120)]
    #[case(3, 240)]
    #[case(6, 1920)]
    #[case(7, 3600)] // 30 * 2^7 = 3840, capped
    #[case(100, 3600)]
    fn test_backoff_doubles_until_cap(#[case] retries: i32, #[case] expected_secs: i64) {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.backoff_delay(retries),
            Duration::seconds(expected_secs)
        );
    }

    #[test]
    fn test_next_available_at_advances() {
        let policy = RetryPolicy::new(10, 100, 5);
        let now = Utc::now();
        assert_eq!(policy.next_available_at(now, 0), now + Duration::seconds(10));
        assert_eq!(policy.next_available_at(now, 2), now + Duration::seconds(40));
    }

    #[test]
    fn test_exhaustion_threshold() {
        let policy = RetryPolicy::new(30, 3600, 3);
        assert!(!policy.is_exhausted(0));
        assert!(!policy.is_exhausted(2));
        assert!(policy.is_exhausted(3));
        assert!(policy.is_exhausted(10));
    }

    #[test]
    fn test_degenerate_inputs_clamped() {
        let policy = RetryPolicy::new(0, -5, 0);
        assert_eq!(policy.backoff_delay(0), Duration::seconds(1));
        assert_eq!(policy.max_retries(), 1);
    }

    #[test]
    fn test_huge_base_never_goes_negative() {
        let policy = RetryPolicy::new(i64::MAX, i64::MAX, 8);
        let delay = policy.backoff_delay(1);
        assert!(delay > Duration::zero());
        assert_eq!(delay, Duration::seconds(MAX_DELAY_SECS));
    }
}
