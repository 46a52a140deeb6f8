//! Bounded exponential backoff around idempotent reads

use crate::aws::AwsError;
use std::thread;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls, including the first
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Sleep after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails terminally, or the attempts run out
pub fn with_backoff<T, F>(policy: &RetryPolicy, action: &str, mut op: F) -> Result<T, AwsError>
where
    F: FnMut() -> Result<T, AwsError>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    action, attempt, attempts, delay, err
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttled() -> AwsError {
        AwsError::Service {
            status: 400,
            code: "ThrottlingException".to_string(),
            message: "Rate exceeded".to_string(),
        }
    }

    fn denied() -> AwsError {
        AwsError::Service {
            status: 400,
            code: "AccessDeniedException".to_string(),
            message: "not authorized".to_string(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_delays_double_and_cap() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=6).map(|a| policy.delay_for(a).as_secs()).collect();
        assert_eq!(delays, vec![5, 10, 20, 40, 60, 60]);
        assert_eq!(policy.delay_for(40), Duration::from_secs(60));
    }

    #[test]
    fn test_retries_transient_errors_until_success() {
        let mut calls = 0;
        let result = with_backoff(&RetryPolicy::immediate(5), "ListDataCatalogs", || {
            calls += 1;
            if calls < 3 {
                Err(throttled())
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_gives_up_after_attempts() {
        let mut calls = 0;
        let result: Result<(), _> = with_backoff(&RetryPolicy::immediate(5), "ListDatabases", || {
            calls += 1;
            Err(throttled())
        });
        assert_eq!(result.unwrap_err().code(), Some("ThrottlingException"));
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_terminal_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = with_backoff(&RetryPolicy::immediate(5), "ListWorkGroups", || {
            calls += 1;
            Err(denied())
        });
        assert_eq!(result.unwrap_err().code(), Some("AccessDeniedException"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_zero_attempts_still_calls_once() {
        let mut calls = 0;
        let _: Result<(), _> = with_backoff(&RetryPolicy::immediate(0), "ListDataCatalogs", || {
            calls += 1;
            Err(throttled())
        });
        assert_eq!(calls, 1);
    }
}
