use std::time::Duration;

use rand::Rng as _;

/// Retry decision returned by the error classifier callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Retry,
    Abort,
}

/// Exponential backoff configuration with jitter.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 5,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    /// Compute the delay for a given retry attempt (0-indexed).
    ///
    /// Formula: `min(base_delay * 2^retry, max_delay) + random_jitter(0..base_delay)`
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exp_delay = self
            .base_delay_secs
            .saturating_mul(1u64.checked_shl(retry).unwrap_or(u64::MAX));
        let capped = exp_delay.min(self.max_delay_secs);
        let jitter = if self.base_delay_secs > 0 {
            rand::thread_rng().gen_range(0..self.base_delay_secs)
        } else {
            0
        };
        Duration::from_secs(capped + jitter)
    }
}

/// Run `operation` until it succeeds, the classifier says `Abort`, or the
/// retries are used up. Sleeps the calling thread between attempts.
pub fn retry_with_backoff<F, T, E, C>(config: &RetryConfig, classifier: C, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    C: Fn(&E) -> RetryAction,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(val) => return Ok(val),
            Err(e) => {
                if classifier(&e) == RetryAction::Abort || attempt >= config.max_retries {
                    return Err(e);
                }
                let delay = config.delay_for_retry(attempt);
                tracing::warn!(
                    "Attempt {}/{} failed: {}. Retrying in {}s...",
                    attempt + 1,
                    config.max_retries + 1,
                    e,
                    delay.as_secs()
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn instant() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_secs: 0,
            max_delay_secs: 0,
        }
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_retries: 10,
            base_delay_secs: 5,
            max_delay_secs: 60,
        };
        let d = config.delay_for_retry(0);
        assert!(d >= Duration::from_secs(5) && d < Duration::from_secs(10));
        let d = config.delay_for_retry(20);
        assert!(d >= Duration::from_secs(60) && d < Duration::from_secs(65));
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let result: Result<u32, String> = retry_with_backoff(
            &instant(),
            |_| RetryAction::Retry,
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err("flaky".into())
                } else {
                    Ok(7)
                }
            },
        );
        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let calls = Cell::new(0);
        let result: Result<(), String> = retry_with_backoff(
            &instant(),
            |_| RetryAction::Retry,
            || {
                calls.set(calls.get() + 1);
                Err("down".into())
            },
        );
        assert_eq!(result, Err("down".into()));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_abort_stops_immediately() {
        let calls = Cell::new(0);
        let result: Result<(), String> = retry_with_backoff(
            &instant(),
            |_| RetryAction::Abort,
            || {
                calls.set(calls.get() + 1);
                Err("fatal".into())
            },
        );
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
