//! Generic retry-with-backoff driver for re-invokable units of work.
//!
//! The driver is parameterized by a conflict-classification predicate, not
//! hardcoded to one error code set. Work handed to it must re-derive every
//! decision from scratch on each attempt; nothing from a failed attempt may
//! be carried over.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// Backoff schedule and attempt budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each attempt after.
    pub base_delay: Duration,
    /// Upper bound (exclusive) of the random jitter added to each delay,
    /// to desynchronize competing retriers after a shared conflict.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_jitter: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay * (1u32 << attempt);
        if self.max_jitter.is_zero() {
            return backoff;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..self.max_jitter.as_millis() as u64);
        backoff + Duration::from_millis(jitter_ms)
    }
}

/// Failure of a retried unit of work.
///
/// Exhaustion is reported as its own condition carrying the attempt count
/// rather than the last underlying error, so callers can distinguish "gave
/// up after contention" from a specific failure.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The work failed with a non-transient error; returned unchanged.
    Inner(E),
    /// Every attempt failed with a transient conflict.
    Exhausted { attempts: u32 },
}

/// Run `work` until it succeeds, fails non-transiently, or the attempt
/// budget is spent. `is_transient` decides which errors are worth retrying.
pub async fn with_backoff<T, E, W, Fut, P>(
    policy: RetryPolicy,
    is_transient: P,
    mut work: W,
) -> Result<T, RetryError<E>>
where
    W: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    for attempt in 0..policy.max_attempts {
        match work().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) => {
                // No point backing off once the budget is spent.
                if attempt + 1 == policy.max_attempts {
                    break;
                }
                let delay = policy.delay(attempt);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient conflict, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(RetryError::Inner(err)),
        }
    }
    Err(RetryError::Exhausted {
        attempts: policy.max_attempts,
    })
}
