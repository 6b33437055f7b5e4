use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::{
    error::{CallError, RemoteError},
    observe::{Event, ObserverHandle},
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
/// Longest server wait hint that is honoured as given.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// How often and how patiently a remote call is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// `base_delay * 2^attempt`, saturating.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.checked_pow(attempt).unwrap_or(u32::MAX))
    }

    /// Delay before the retry that follows failed attempt number `attempt`
    /// (zero based). A server wait hint wins over the computed backoff but is
    /// clamped to [`MAX_RETRY_AFTER`].
    pub fn delay_for(&self, attempt: u32, error: &RemoteError) -> Duration {
        match error {
            RemoteError::RateLimited {
                retry_after: Some(hint),
            } if *hint > MAX_RETRY_AFTER => {
                tracing::warn!(
                    requested = ?hint,
                    waiting = ?MAX_RETRY_AFTER,
                    "server wait hint clamped"
                );
                MAX_RETRY_AFTER
            }
            RemoteError::RateLimited {
                retry_after: Some(hint),
            } => *hint,
            _ => self.backoff(attempt),
        }
    }
}

/// Applies a [`RetryPolicy`] to any remote operation.
#[derive(Clone)]
pub struct ResilientCaller {
    policy: RetryPolicy,
    observer: ObserverHandle,
}

impl ResilientCaller {
    pub fn new(policy: RetryPolicy, observer: ObserverHandle) -> Self {
        Self { policy, observer }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error or the
    /// policy runs out of attempts.
    ///
    /// Rate-limit and transient failures are retried after
    /// [`RetryPolicy::delay_for`]; anything else is handed back at once as
    /// [`CallError::Rejected`]. Running out of attempts yields
    /// [`CallError::Exhausted`] carrying the last error seen.
    pub async fn call<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt: u32 = 0;

        loop {
            self.observer.emit(&Event::Attempt {
                operation,
                attempt: attempt + 1,
            });

            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                self.observer.emit(&Event::Rejected {
                    operation,
                    error: error.clone(),
                });
                return Err(CallError::Rejected {
                    operation,
                    source: error,
                });
            }

            if attempt + 1 >= self.policy.max_attempts {
                self.observer.emit(&Event::Exhausted {
                    operation,
                    attempts: attempt + 1,
                    error: error.clone(),
                });
                return Err(CallError::Exhausted {
                    operation,
                    attempts: attempt + 1,
                    last: error,
                });
            }

            let delay = self.policy.delay_for(attempt, &error);
            self.observer.emit(&Event::Retry {
                operation,
                attempt: attempt + 1,
                delay,
                error,
            });
            sleep(delay).await;
            attempt += 1;
        }
    }
}
