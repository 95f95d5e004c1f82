//! Bounded retry with exponential backoff for dependency calls.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::RetrievalError;

/// Retry policy for embedding backend calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Run `op` up to `max_attempts` times. Only retryable failures are
    /// retried; validation errors pass straight through. When attempts are
    /// exhausted the failure surfaces as retryable so the conversation can
    /// continue without the evidence.
    pub async fn run<T, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T, RetrievalError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RetrievalError>>,
    {
        let mut last_reason = String::new();
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.delay_for(attempt)).await;
            }
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        op = op_name,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Dependency call failed, retrying"
                    );
                    last_reason = e.to_string();
                }
                Err(e) => return Err(e),
            }
        }
        Err(RetrievalError::RetriesExhausted {
            attempts: self.max_attempts,
            reason: last_reason,
        })
    }

    /// Exponential backoff with jitter: base * 2^(attempt-1) + rand(0..base).
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base_delay * 2u32.saturating_pow(attempt - 1);
        let jitter_ms = rand::thread_rng().gen_range(0..=self.base_delay.as_millis().max(1) as u64);
        exp + Duration::from_millis(jitter_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_first_try() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result = policy
            .run("test", move || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, RetrievalError>(42)
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result = policy
            .run("test", move || {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(RetrievalError::Backend("boom".to_string()))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_retryable() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let err = policy
            .run("test", || async {
                Err::<(), _>(RetrievalError::Backend("down".to_string()))
            })
            .await
            .unwrap_err();

        match err {
            RetrievalError::RetriesExhausted { attempts, reason } => {
                assert_eq!(attempts, 2);
                assert!(reason.contains("down"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(
            RetrievalError::RetriesExhausted {
                attempts: 2,
                reason: String::new()
            }
            .is_retryable()
        );
    }

    #[tokio::test]
    async fn validation_errors_are_not_retried() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let err = policy
            .run("test", move || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(RetrievalError::InvalidQuery("blank".to_string()))
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::InvalidQuery(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
