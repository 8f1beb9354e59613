use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, RetryStrategy};

/// リトライ実行結果
#[derive(Debug)]
pub enum RetryResult<T> {
    /// 成功
    Success(T),
    /// 最大試行回数に達して失敗
    MaxAttemptsReached(AppError),
    /// リトライ不可能なエラーで失敗
    NonRetryable(AppError),
}

impl<T> RetryResult<T> {
    /// 通常の Result に変換
    pub fn into_result(self) -> Result<T, AppError> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::MaxAttemptsReached(error) | RetryResult::NonRetryable(error) => {
                Err(error)
            }
        }
    }
}

/// リトライ実行器
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    strategy: RetryStrategy,
}

impl RetryExecutor {
    pub fn new(strategy: RetryStrategy) -> Self {
        Self { strategy }
    }

    /// リトライなし（1回だけ実行）
    pub fn no_retry() -> Self {
        Self::new(RetryStrategy {
            max_attempts: 1,
            ..RetryStrategy::default()
        })
    }

    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    /// 操作をリトライ付きで実行
    pub async fn execute<F, Fut, T>(&self, operation: F) -> RetryResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let max_attempts = self.strategy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(attempt, max_attempts, "Executing operation");

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retry");
                    }
                    return RetryResult::Success(result);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        warn!(error = %error, "Non-retryable error encountered");
                        return RetryResult::NonRetryable(error);
                    }

                    if attempt >= max_attempts {
                        error!(max_attempts, error = %error, "Max attempts reached, giving up");
                        return RetryResult::MaxAttemptsReached(error);
                    }

                    let delay = self.calculate_delay(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Operation failed, retrying"
                    );

                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// 遅延時間を計算
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let multiplier = self
            .strategy
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let base_delay =
            Duration::from_millis((self.strategy.initial_delay.as_millis() as f64 * multiplier) as u64);

        // 最大遅延時間でクランプ
        let delay = std::cmp::min(base_delay, self.strategy.max_delay);

        if self.strategy.add_jitter {
            add_jitter(delay)
        } else {
            delay
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryStrategy::default())
    }
}

/// ジッターを追加（±25%のランダム変動）
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor = rng.gen_range(0.75..=1.25);
    Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_strategy(max_attempts: u32) -> RetryStrategy {
        RetryStrategy {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    #[tokio::test]
    async fn test_retry_success_on_first_attempt() {
        let executor = RetryExecutor::default();
        let result = executor.execute(|| async { Ok::<i32, AppError>(42) }).await;

        match result {
            RetryResult::Success(value) => assert_eq!(value, 42),
            _ => panic!("Expected success"),
        }
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let executor = RetryExecutor::new(fast_strategy(3));
        let result = executor
            .execute(|| {
                let count = attempt_count_clone.clone();
                async move {
                    let current = count.fetch_add(1, Ordering::SeqCst) + 1;
                    if current < 3 {
                        Err(AppError::Network("connection reset".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.into_result(), Ok(42));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let executor = RetryExecutor::new(fast_strategy(5));
        let result = executor
            .execute(|| {
                let count = attempt_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, AppError>(AppError::NotFound("card 1".to_string()))
                }
            })
            .await;

        assert!(matches!(result, RetryResult::NonRetryable(AppError::NotFound(_))));
        // 1回のみ実行
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_max_attempts_reached() {
        let executor = RetryExecutor::new(fast_strategy(2));

        let result = executor
            .execute(|| async {
                Err::<i32, AppError>(AppError::ServiceUnavailable("Always fails".to_string()))
            })
            .await;

        assert!(matches!(result, RetryResult::MaxAttemptsReached(_)));
    }

    #[tokio::test]
    async fn test_no_retry_runs_once() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result = RetryExecutor::no_retry()
            .execute(|| {
                let count = attempt_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, AppError>(AppError::Timeout("slow".to_string()))
                }
            })
            .await;

        assert!(matches!(result, RetryResult::MaxAttemptsReached(_)));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_calculation() {
        // 指数バックオフのテスト（ジッターなし）
        let executor_no_jitter = RetryExecutor::new(RetryStrategy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            backoff_multiplier: 2.0,
            add_jitter: false,
        });

        assert_eq!(executor_no_jitter.calculate_delay(1), Duration::from_millis(100));
        assert_eq!(executor_no_jitter.calculate_delay(2), Duration::from_millis(200));
        // 最大遅延でクランプされる
        assert_eq!(executor_no_jitter.calculate_delay(3), Duration::from_millis(300));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        for _ in 0..100 {
            let delay = add_jitter(Duration::from_millis(1000));
            assert!(delay >= Duration::from_millis(750) && delay <= Duration::from_millis(1250));
        }
    }
}
