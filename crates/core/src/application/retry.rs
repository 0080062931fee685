// Store retry policy - bounded backoff for transient store faults

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::Result;

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given backoff delay
    Retry(Duration),
    /// Attempts exhausted; surface the error
    GiveUp,
}

/// Backoff policy for transient `StoreUnavailable` failures.
///
/// Retrying is safe because every store write is conditional: either the
/// write committed or it did not, there is no partial state to undo.
/// Validation and configuration errors are never retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, backoff_factor: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            backoff_factor,
        }
    }

    /// No retries; the first failure surfaces immediately
    pub fn none() -> Self {
        Self::new(1, 0, 1.0)
    }

    /// Decide what to do after a failed attempt (1-based)
    ///
    /// Backoff formula: delay = base_delay * backoff_factor ^ (attempt - 1)
    pub fn after_attempt(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        let delay_ms =
            self.base_delay_ms as f64 * self.backoff_factor.powi(attempt.saturating_sub(1) as i32);
        RetryDecision::Retry(Duration::from_millis(delay_ms as u64))
    }
}

/// Run `op`, retrying transient failures per `policy`.
///
/// The closure builds a fresh future per attempt; callers capture owned
/// clones so the retried future holds no in-process lock across the store
/// round trip.
pub async fn with_retries<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Err(e) if e.is_transient() => match policy.after_attempt(attempt) {
                RetryDecision::Retry(delay) => {
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient store failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp => return Err(e),
            },
            other => return other,
        }
    }
}
