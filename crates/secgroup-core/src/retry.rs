// ── Bounded retry policy ──
//
// Runs an async operation until it succeeds, fails with an error the
// predicate deems fatal, the deadline passes, or the caller cancels.
// The deadline is measured from loop entry and also bounds each in-flight
// attempt, except that an attempt issued close to the deadline may run for
// up to `FINAL_ATTEMPT_GRACE` so a request already on the wire can report
// its outcome. Cancellation always takes priority over the deadline.
//
// Time comes from the tokio clock, so tests pause it and let the runtime
// auto-advance through the sleeps.

use std::future::Future;
use std::time::Duration;

use strum::Display;
use tokio::time::{Instant, sleep_until, timeout_at};
use tokio_util::sync::CancellationToken;

/// Lower bound on the wait between attempts.
pub const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on the overall deadline.
pub const MAX_RETRY_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Minimum time an attempt gets before the deadline cuts it off.
pub const FINAL_ATTEMPT_GRACE: Duration = Duration::from_secs(5);

/// Transitions reported to the observer, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RetryState {
    /// Attempt `n` (1-based) is being issued.
    Attempting { attempt: u32 },
    /// Attempt `n` failed with a retryable error; waiting for the next one.
    Waiting { attempt: u32 },
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
}

/// Terminal failure of [`RetryPolicy::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The operation failed with a non-retryable error.
    Fatal(E),
    /// The deadline passed while the operation was still being refused.
    TimedOut { attempts: u32 },
    Cancelled { attempts: u32 },
}

/// Fixed-interval retry bounded by an overall deadline.
#[derive(Debug, Clone)]
pub struct RetryPolicy<P> {
    interval: Duration,
    timeout: Duration,
    retryable: P,
}

impl<P> RetryPolicy<P> {
    /// `interval` is raised to [`MIN_RETRY_INTERVAL`] and `timeout` capped at
    /// [`MAX_RETRY_TIMEOUT`].
    pub fn new(interval: Duration, timeout: Duration, retryable: P) -> Self {
        Self {
            interval: interval.clamp(MIN_RETRY_INTERVAL, MAX_RETRY_TIMEOUT),
            timeout: timeout.min(MAX_RETRY_TIMEOUT),
            retryable,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `operation` under this policy. The first attempt is immediate.
    pub async fn run<T, E, F, Fut, O>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
        mut observe: O,
    ) -> Result<T, RetryError<E>>
    where
        P: Fn(&E) -> bool,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        O: FnMut(RetryState),
    {
        let deadline = far_instant(Instant::now(), self.timeout);
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                observe(RetryState::Cancelled);
                return Err(RetryError::Cancelled { attempts });
            }

            attempts += 1;
            observe(RetryState::Attempting { attempt: attempts });

            let cutoff = deadline.max(far_instant(Instant::now(), FINAL_ATTEMPT_GRACE));
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                result = timeout_at(cutoff, operation()) => Some(result),
            };

            match outcome {
                None => {
                    observe(RetryState::Cancelled);
                    return Err(RetryError::Cancelled { attempts });
                }
                Some(Err(_elapsed)) => {
                    observe(RetryState::TimedOut);
                    return Err(RetryError::TimedOut { attempts });
                }
                Some(Ok(Ok(value))) => {
                    observe(RetryState::Succeeded);
                    return Ok(value);
                }
                Some(Ok(Err(err))) => {
                    if !(self.retryable)(&err) {
                        observe(RetryState::Failed);
                        return Err(RetryError::Fatal(err));
                    }
                    observe(RetryState::Waiting { attempt: attempts });
                }
            }

            let wake = far_instant(Instant::now(), self.interval);
            let expired = wake > deadline;
            let cancelled = tokio::select! {
                biased;
                () = cancel.cancelled() => true,
                () = sleep_until(wake.min(deadline)) => false,
            };
            if cancelled {
                observe(RetryState::Cancelled);
                return Err(RetryError::Cancelled { attempts });
            }
            if expired {
                observe(RetryState::TimedOut);
                return Err(RetryError::TimedOut { attempts });
            }
        }
    }
}

fn far_instant(from: Instant, after: Duration) -> Instant {
    from.checked_add(after)
        .or_else(|| from.checked_add(MAX_RETRY_TIMEOUT))
        .unwrap_or(from)
}
