//! Bounded retry for optimistic-concurrency conflicts.
//!
//! Funding and copy writes are checked against the wish revision they read.
//! When another writer got there first the whole read-validate-write attempt
//! is repeated after an exponentially growing, jittered pause. A conflict
//! always means some other write committed, so retries make global progress.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use super::Error;

/// Retry limits for conflicting writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves as one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Un-jittered pause before retrying after failed attempt `attempt`.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use wishlist_backend::domain::RetryPolicy;
    ///
    /// let policy = RetryPolicy {
    ///     max_attempts: 5,
    ///     initial_backoff: Duration::from_millis(10),
    ///     max_backoff: Duration::from_millis(25),
    /// };
    /// assert_eq!(policy.base_delay(1), Duration::from_millis(10));
    /// assert_eq!(policy.base_delay(2), Duration::from_millis(20));
    /// assert_eq!(policy.base_delay(3), Duration::from_millis(25));
    /// ```
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

/// Async sleeping abstraction so tests can skip real pauses.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-backed sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Result of a single optimistic attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The write committed.
    Done(T),
    /// Another writer moved the revision; the attempt must be repeated.
    Conflict,
}

/// Runs optimistic attempts until one commits or the policy is exhausted.
#[derive(Clone)]
pub struct ConflictRetry {
    policy: RetryPolicy,
    sleeper: Arc<dyn RetrySleeper>,
}

impl Default for ConflictRetry {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), Arc::new(TokioSleeper))
    }
}

impl ConflictRetry {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn RetrySleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `attempt` until it reports [`Attempt::Done`].
    ///
    /// Errors returned by an attempt end the loop immediately. Running out
    /// of attempts yields [`Error::service_unavailable`].
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> Result<T, Error>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Attempt<T>, Error>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        for current in 1..=max_attempts {
            match attempt(current).await? {
                Attempt::Done(value) => return Ok(value),
                Attempt::Conflict if current < max_attempts => {
                    let delay = jittered(self.policy.base_delay(current));
                    debug!(operation, attempt = current, ?delay, "write conflict, retrying");
                    self.sleeper.sleep(delay).await;
                }
                Attempt::Conflict => {}
            }
        }
        warn!(operation, attempts = max_attempts, "write conflict retries exhausted");
        Err(Error::service_unavailable(
            "the item is being updated concurrently, please retry",
        ))
    }
}

fn jittered(base: Duration) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let max_extra = (base_ms / 4).max(1);
    let extra = rand::thread_rng().gen_range(0..=max_extra);
    Duration::from_millis(base_ms.saturating_add(extra))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl RetrySleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().expect("delays mutex").push(duration);
        }
    }

    fn retry(max_attempts: u32) -> (ConflictRetry, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(8),
            max_backoff: Duration::from_millis(20),
        };
        (ConflictRetry::new(policy, sleeper.clone()), sleeper)
    }

    #[tokio::test]
    async fn succeeds_after_conflicts_with_growing_pauses() {
        let (retry, sleeper) = retry(4);
        let calls = AtomicU32::new(0);
        let value = retry
            .run("test", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Ok(Attempt::Conflict)
                    } else {
                        Ok(Attempt::Done(attempt))
                    }
                }
            })
            .await
            .expect("third attempt commits");

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let delays = sleeper.delays.lock().expect("delays mutex").clone();
        assert_eq!(delays.len(), 2);
        assert!(delays[0] >= Duration::from_millis(8) && delays[0] <= Duration::from_millis(10));
        assert!(delays[1] >= Duration::from_millis(16) && delays[1] <= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn exhaustion_reports_service_unavailable() {
        let (retry, sleeper) = retry(3);
        let err = retry
            .run("test", |_| async { Ok::<_, Error>(Attempt::<()>::Conflict) })
            .await
            .expect_err("always conflicting");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(sleeper.delays.lock().expect("delays mutex").len(), 2);
    }

    #[tokio::test]
    async fn attempt_errors_stop_the_loop() {
        let (retry, sleeper) = retry(5);
        let err = retry
            .run("test", |_| async { Err::<Attempt<()>, _>(Error::not_found("gone")) })
            .await
            .expect_err("error propagates");

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(sleeper.delays.lock().expect("delays mutex").is_empty());
    }

    #[rstest]
    #[case(1, 10)]
    #[case(2, 20)]
    #[case(5, 160)]
    #[case(6, 200)]
    #[case(40, 200)]
    fn base_delay_doubles_until_capped(#[case] attempt: u32, #[case] expected_ms: u64) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay(attempt), Duration::from_millis(expected_ms));
    }
}
