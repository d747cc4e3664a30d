//! Bounded retry with exponential backoff for page requests

use std::time::Duration;

use indicatif::ProgressBar;

use crate::error::CollectError;

/// How many times a transient failure is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps, for tests and replayed sources.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay after failed attempt `attempt` (1-based): base, 2*base, 4*base, ...
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(2u32.pow(exp))
    }
}

/// Run `attempt_fn` until it succeeds, fails with a non-retryable error,
/// or `policy.max_attempts` is used up.
///
/// Retries are counted explicitly; there is no recursion. The last error is
/// returned unchanged on exhaustion so callers can still classify it.
pub fn retry_with_backoff<T>(
    label: &str,
    policy: RetryPolicy,
    pb: &ProgressBar,
    mut attempt_fn: impl FnMut() -> Result<T, CollectError>,
) -> Result<T, CollectError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.backoff_duration(attempt);
                log::warn!("{label}: attempt {attempt}/{max_attempts} failed: {e}, retrying in {delay:?}");
                pb.set_message(format!("retry {attempt}/{max_attempts}..."));
                attempt += 1;
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            Err(e) => {
                // Caller reports the failure
                if e.is_retryable() {
                    log::debug!("{label}: giving up after {attempt} attempts: {e}");
                } else {
                    log::debug!("{label}: not retryable: {e}");
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
        };
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_duration(2), Duration::from_secs(1));
        assert_eq!(policy.backoff_duration(3), Duration::from_secs(2));
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = retry_with_backoff("page 1", RetryPolicy::immediate(3), &ProgressBar::hidden(), || {
            calls += 1;
            if calls < 3 {
                Err(CollectError::transient("timeout"))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<(), _> =
            retry_with_backoff("page 1", RetryPolicy::immediate(3), &ProgressBar::hidden(), || {
                calls += 1;
                Err(CollectError::transient("connection reset"))
            });
        assert_eq!(calls, 3);
        assert!(matches!(result, Err(CollectError::TransientNetwork { .. })));
    }

    #[test]
    fn fatal_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> =
            retry_with_backoff("page 1", RetryPolicy::immediate(3), &ProgressBar::hidden(), || {
                calls += 1;
                Err(CollectError::from_status(401, "Bad credentials"))
            });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(CollectError::Authentication { .. })));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let mut calls = 0;
        let result = retry_with_backoff("page 1", RetryPolicy::immediate(0), &ProgressBar::hidden(), || {
            calls += 1;
            Ok::<_, CollectError>(())
        });
        assert!(result.is_ok());
        assert_eq!(calls, 1);
    }
}
