use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::warn;

use crate::error::{RdsDataError, Result};

/// Time source used by the liveness probe; swapped for a manual clock in tests.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Run `op` until it succeeds or the attempts run out, sleeping on `clock` in between.
    ///
    /// Cancellation is never retried.
    ///
    /// # Errors
    /// [`RdsDataError::WakeupFailed`] carrying the attempt count and the last error.
    pub async fn run<T, F, Fut>(&self, clock: &dyn Clock, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(RdsDataError::Cancelled) => return Err(RdsDataError::Cancelled),
                Err(err) if attempt >= max_attempts => {
                    return Err(RdsDataError::WakeupFailed {
                        attempts: attempt,
                        last_error: Box::new(err),
                    });
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "attempt failed, retrying");
                    clock.sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingClock {
        sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Clock for CountingClock {
        fn now(&self) -> Instant {
            Instant::now()
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let clock = CountingClock::default();
        let policy = RetryPolicy::new(5, Duration::from_millis(250));
        let out = policy
            .run(&clock, |attempt| async move {
                if attempt < 3 {
                    Err(RdsDataError::InvalidVersionResponse)
                } else {
                    Ok(attempt)
                }
            })
            .await
            .unwrap();
        assert_eq!(out, 3);
        assert_eq!(*clock.sleeps.lock().unwrap(), vec![Duration::from_millis(250); 2]);
    }

    #[tokio::test]
    async fn reports_attempt_count_when_exhausted() {
        let clock = CountingClock::default();
        let err = RetryPolicy::default()
            .run(&clock, |_| async { Err::<(), _>(RdsDataError::InvalidVersionResponse) })
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("after 10 attempts, last error:"));
        assert_eq!(clock.sleeps.lock().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn cancellation_is_not_retried() {
        let clock = CountingClock::default();
        let err = RetryPolicy::default()
            .run(&clock, |_| async { Err::<(), _>(RdsDataError::Cancelled) })
            .await
            .unwrap_err();
        assert!(matches!(err, RdsDataError::Cancelled));
        assert!(clock.sleeps.lock().unwrap().is_empty());
    }
}
