//! Bounded retry with exponential backoff.

use crate::error::StoreError;
use std::future::Future;
use std::time::Duration;

/// Bounded retry policy for remote calls.
///
/// The first attempt is free; each retry waits `base_delay * 2^(attempt-1)`.
/// Only errors classified retryable by [`StoreError::is_retryable`] are
/// retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first (>= 1)
    pub max_attempts: u32,
    /// Backoff base delay
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt budget and base delay in milliseconds.
    #[inline]
    #[must_use]
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// Run `operation`, retrying transient failures within the budget.
    ///
    /// # Errors
    /// Returns the last error once the budget is exhausted, or immediately
    /// for non-retryable errors.
    pub async fn run<T, F, Fut>(&self, name: &str, mut operation: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 1u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        operation = name,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient store failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, 10);
        let result = policy
            .run("fetch", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StoreError::Connection("refused".into()))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_budget_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, 10);
        let result: Result<(), _> = policy
            .run("fetch", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::Storage("timeout".into()))
            })
            .await;
        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_retry_semantic_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, 10);
        let result: Result<(), _> = policy
            .run("download", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::NotFound("key".into()))
            })
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
