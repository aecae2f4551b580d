use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::OperatorCallError;

/// Bounded exponential backoff applied uniformly to every outbound
/// operator call. Only rate-limit and connection failures are retried;
/// operator-reported API errors surface immediately. The delay for
/// attempt n is base * 2^n.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Run `call` until it succeeds, fails non-transiently, or the retry
    /// budget is spent. Exhaustion returns the last transient error so the
    /// caller can still tell "rate limited" from "connection failed".
    pub async fn run<T, F, Fut>(&self, operator: &str, mut call: F) -> Result<T, OperatorCallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OperatorCallError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operator,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient operator failure, backing off: {err}"
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
    use crate::error::OperatorError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = quick_policy(3)
            .run("maghreb", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(OperatorCallError::Connection {
                            operator: "maghreb".to_string(),
                            message: "reset".to_string(),
                        })
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_rate_limit_classification() {
        let result: Result<(), _> = quick_policy(2)
            .run("adriatic", || async {
                Err(OperatorCallError::RateLimited {
                    operator: "adriatic".to_string(),
                    message: "window".to_string(),
                })
            })
            .await;
        assert!(matches!(
            result,
            Err(OperatorCallError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_api_errors_never_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = quick_policy(5)
            .run("maghreb", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(OperatorCallError::Api(OperatorError {
                        operator: "maghreb".to_string(),
                        message: "invalid route".to_string(),
                        code: Some("E422".to_string()),
                        http_status: Some(422),
                    }))
                }
            })
            .await;
        assert!(matches!(result, Err(OperatorCallError::Api(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
