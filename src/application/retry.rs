//! Bounded fixed-interval retry.
//!
//! Used for balance polling, result polling and credential reads. The
//! operation decides per attempt whether it is done; the policy decides when
//! to give up. What giving up means is left to the caller.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Result of one attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Done(T),
    Retry(String),
}

/// The policy ran out of attempts or time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("gave up after {attempts} attempts ({elapsed:?}): {last_reason}")]
pub struct RetryExhausted {
    pub attempts: u32,
    pub elapsed: Duration,
    pub last_reason: String,
}

/// Fixed-interval retry bounded by attempt count and optionally by total
/// elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub max_elapsed: Option<Duration>,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    #[must_use]
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
            max_elapsed: None,
        }
    }

    #[must_use]
    pub const fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = Some(max_elapsed);
        self
    }

    /// Run `op` until it returns [`Attempt::Done`] or the policy is exhausted.
    ///
    /// `op` receives the 1-based attempt number. The wait between attempts is
    /// a timer suspension, never a busy loop. No sleep happens after the final
    /// attempt, and a sleep that would overrun `max_elapsed` is not started.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] with the last retry reason.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RetryExhausted>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let started = Instant::now();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let reason = match op(attempt).await {
                Attempt::Done(value) => return Ok(value),
                Attempt::Retry(reason) => reason,
            };

            let elapsed = started.elapsed();
            let out_of_attempts = attempt >= self.max_attempts;
            let out_of_time = self
                .max_elapsed
                .is_some_and(|max| elapsed + self.interval > max);
            if out_of_attempts || out_of_time {
                return Err(RetryExhausted {
                    attempts: attempt,
                    elapsed,
                    last_reason: reason,
                });
            }

            debug!(attempt, reason = %reason, "Retrying");
            tokio::time::sleep(self.interval).await;
        }
    }
}
