//! Backoff policies for retryable failures.

use std::thread;
use std::time::Duration;

/// A capped exponential backoff schedule.
///
/// Pure configuration: the policy computes delays but never sleeps or
/// executes anything itself. Pair with [`retry_with_backoff`] when a
/// driven loop is wanted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per subsequent attempt.
    pub backoff_factor: f64,
}

impl RetryPolicy {
    /// Preset for local storage operations.
    #[must_use]
    pub fn storage() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
        }
    }

    /// Preset for network operations.
    #[must_use]
    pub fn network() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
        }
    }

    /// Preset for file I/O operations.
    #[must_use]
    pub fn file_io() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
        }
    }

    /// The delay to wait before the given zero-based attempt.
    ///
    /// Attempt 0 runs immediately; attempt `n` waits
    /// `initial_delay * backoff_factor^(n-1)`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = self.backoff_factor.powi(attempt.saturating_sub(1) as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

/// Runs a fallible operation under a retry policy, sleeping between
/// attempts.
///
/// Returns the first success, or the last error once attempts are
/// exhausted. The operation is invoked at least once even when
/// `max_attempts` is zero.
///
/// # Errors
///
/// Propagates the operation's final error unchanged.
pub fn retry_with_backoff<T, E>(
    policy: &RetryPolicy,
    mut operation: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        let delay = policy.delay_for_attempt(attempt);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(error);
                }
                tracing::debug!(attempt, "retrying after failure");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn presets_match_operation_classes() {
        let storage = RetryPolicy::storage();
        assert_eq!(storage.max_attempts, 3);
        assert_eq!(storage.initial_delay, Duration::from_millis(500));
        assert_eq!(storage.max_delay, Duration::from_secs(5));

        let network = RetryPolicy::network();
        assert_eq!(network.max_attempts, 5);
        assert_eq!(network.initial_delay, Duration::from_secs(1));
        assert_eq!(network.max_delay, Duration::from_secs(10));

        let file_io = RetryPolicy::file_io();
        assert_eq!(file_io.max_attempts, 2);
        assert_eq!(file_io.initial_delay, Duration::from_millis(250));
        assert_eq!(file_io.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn delays_double_then_cap() {
        let policy = RetryPolicy::storage();
        assert_eq!(policy.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(4000));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(30), Duration::from_secs(5));
    }

    #[test]
    fn succeeds_on_a_later_attempt() {
        let fast = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            backoff_factor: 2.0,
        };
        let calls = Cell::new(0u32);
        let result: Result<&str, &str> = retry_with_backoff(&fast, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err("transient")
            } else {
                Ok("done")
            }
        });
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhaustion_returns_the_last_error() {
        let fast = RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_factor: 2.0,
        };
        let calls = Cell::new(0u32);
        let result: Result<(), String> = retry_with_backoff(&fast, || {
            calls.set(calls.get() + 1);
            Err(format!("failure {}", calls.get()))
        });
        assert_eq!(result, Err("failure 2".to_string()));
    }

    #[test]
    fn zero_attempt_policy_still_runs_once() {
        let degenerate = RetryPolicy {
            max_attempts: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_factor: 2.0,
        };
        let result: Result<u32, &str> = retry_with_backoff(&degenerate, || Ok(7));
        assert_eq!(result, Ok(7));
    }
}
