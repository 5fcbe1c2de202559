use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::errors::AppError;

/// Bounded retry with exponential backoff for inference calls.
///
/// An operation is attempted up to `max_retries + 1` times. Only errors
/// classified transient (`AppError::is_transient`) are retried; anything
/// else, validation failures above all, passes through on first
/// occurrence. Between attempt `i` and `i + 1` the policy sleeps
/// `backoff_factor * 2^i` seconds on the cooperative clock, so concurrent
/// tasks keep running during the wait. There is deliberately no jitter: the
/// delay sequence is part of the observable contract.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    /// Runs `operation`, retrying transient failures with backoff.
    ///
    /// On exhaustion the intermediate errors are not replayed; the caller
    /// gets a single `AgentRetriesExhausted` wrapping the last one.
    pub async fn run<F, Fut, T>(&self, task: &str, mut operation: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let total_attempts = self.max_retries + 1;
        let mut last_error = None;

        for attempt in 0..total_attempts {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(task, attempts = attempt + 1, "task succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !error.is_transient() {
                        return Err(error);
                    }

                    if attempt + 1 < total_attempts {
                        let delay = self.delay_after(attempt);
                        warn!(
                            task,
                            attempt = attempt + 1,
                            delay_secs = delay.as_secs_f64(),
                            %error,
                            "transient failure, retrying after backoff"
                        );
                        last_error = Some(error);
                        tokio::time::sleep(delay).await;
                    } else {
                        last_error = Some(error);
                    }
                }
            }
        }

        let last = last_error.unwrap_or_else(|| {
            AppError::InferenceFailed("all retry attempts failed".to_string())
        });
        error!(task, attempts = total_attempts, %last, "retries exhausted");
        Err(AppError::AgentRetriesExhausted {
            task: task.to_string(),
            attempts: total_attempts,
            last_error: last.to_string(),
        })
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(self.backoff_factor * 2f64.powi(attempt as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient(msg: &str) -> AppError {
        AppError::InferenceFailed(msg.to_string())
    }

    #[tokio::test]
    async fn test_success_on_first_attempt_makes_one_call() {
        let policy = RetryPolicy::new(3, 1.0);
        let calls = AtomicU32::new(0);

        let result = policy
            .run("unit", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, AppError>(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_transient_failures_then_success() {
        let policy = RetryPolicy::new(3, 1.0);
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = policy
            .run("unit", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(transient("503 from provider"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Backoff after the two failed attempts: 1s then 2s of virtual time.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_error_only() {
        let policy = RetryPolicy::new(2, 1.0);
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = policy
            .run("risk", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(transient(&format!("failure {n}"))) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        match result.unwrap_err() {
            AppError::AgentRetriesExhausted {
                task,
                attempts,
                last_error,
            } => {
                assert_eq!(task, "risk");
                assert_eq!(attempts, 3);
                assert!(last_error.contains("failure 2"), "got: {last_error}");
            }
            other => panic!("expected AgentRetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_transient_error_passes_through_unwrapped() {
        let policy = RetryPolicy::new(3, 1.0);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .run("unit", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::AgentOutputInvalid("bad enum token".to_string())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result.unwrap_err(),
            AppError::AgentOutputInvalid(msg) if msg == "bad enum token"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, 1.0);
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = policy
            .run("unit", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient("boom")) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(matches!(
            result.unwrap_err(),
            AppError::AgentRetriesExhausted { attempts: 1, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_factor_scales_delays() {
        let policy = RetryPolicy::new(2, 0.5);
        let started = tokio::time::Instant::now();

        let _: Result<(), _> = policy
            .run("unit", || async { Err(transient("boom")) })
            .await;

        // 0.5 * 2^0 + 0.5 * 2^1 = 1.5s total.
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
    }
}
