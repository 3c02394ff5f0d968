//! 重试与退避
//!
//! 第 n 次失败后等待 `base_delay × 2^n`，再叠加最多 30% 的随机抖动

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Result, ScrapeError};

/// 抖动上限（相对退避延迟的比例）
pub const MAX_JITTER_RATIO: f64 = 0.3;

/// 计算第 `attempt` 次失败（从 0 开始）后的等待时间
pub fn backoff_delay(base_delay: Duration, attempt: usize) -> Duration {
    let exponent = attempt.min(16) as u32;
    let delay = base_delay.saturating_mul(2u32.saturating_pow(exponent));
    let jitter = rand::thread_rng().gen_range(0.0..=MAX_JITTER_RATIO);
    delay + delay.mul_f64(jitter)
}

/// 执行操作，失败后按指数退避重试
///
/// # 参数
/// - `op`: 每次调用产生一个新的 Future
/// - `retries`: 总尝试次数（至少 1 次）
/// - `base_delay`: 退避基准延迟
///
/// # 返回
/// 成功时返回操作结果；全部失败时返回 `RetryExhausted`，包含每一次的错误信息。
/// 结构性错误（`is_retryable() == false`）不重试：首次尝试即失败时原样返回，
/// 之前已有瞬时失败时返回 `RetryAborted`，保留全部失败信息
pub async fn retry_operation<T, F, Fut>(mut op: F, retries: usize, base_delay: Duration) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = retries.max(1);
    let mut failures = Vec::with_capacity(attempts);

    for attempt in 0..attempts {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("第 {} 次尝试成功", attempt + 1);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => {
                if failures.is_empty() {
                    return Err(e);
                }
                warn!("尝试 {}/{} 遇到不可重试的错误: {}", attempt + 1, attempts, e);
                return Err(ScrapeError::RetryAborted {
                    failures,
                    cause: Box::new(e),
                });
            }
            Err(e) => {
                warn!("尝试 {}/{} 失败: {}", attempt + 1, attempts, e);
                failures.push(e.to_string());

                if attempt + 1 < attempts {
                    let delay = backoff_delay(base_delay, attempt);
                    debug!("等待 {:?} 后重试", delay);
                    sleep(delay).await;
                }
            }
        }
    }

    Err(ScrapeError::RetryExhausted { attempts, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn transient(attempt: usize) -> ScrapeError {
        ScrapeError::navigation_failed("https://example.com", format!("超时 #{}", attempt))
    }

    #[test]
    fn test_backoff_delay_bounds() {
        let base = Duration::from_millis(100);
        for attempt in 0..4 {
            let expected = base * 2u32.pow(attempt as u32);
            let delay = backoff_delay(base, attempt);
            assert!(delay >= expected);
            assert!(delay <= expected.mul_f64(1.0 + MAX_JITTER_RATIO) + Duration::from_millis(1));
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_two_failures() {
        let base = Duration::from_millis(40);
        let calls = &AtomicUsize::new(0);
        let started = Instant::now();

        let result = retry_operation(
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(transient(n))
                } else {
                    Ok("ok")
                }
            },
            3,
            base,
        )
        .await;

        let elapsed = started.elapsed();
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 40ms + 80ms 的退避，抖动不超过 30%
        assert!(elapsed >= base + base * 2);
        assert!(elapsed < (base + base * 2).mul_f64(1.0 + MAX_JITTER_RATIO) + Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_always_failing_reports_every_attempt() {
        let calls = &AtomicUsize::new(0);
        let result: Result<()> = retry_operation(
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(transient(n))
            },
            4,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(ScrapeError::RetryExhausted { attempts, failures }) => {
                assert_eq!(attempts, 4);
                assert_eq!(failures.len(), 4);
                for (i, failure) in failures.iter().enumerate() {
                    assert!(failure.contains(&format!("超时 #{}", i)));
                }
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_structural_error_is_not_retried() {
        let calls = &AtomicUsize::new(0);
        let result: Result<()> = retry_operation(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ScrapeError::invalid_problem_url("https://example.com/oops"))
            },
            5,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScrapeError::InvalidProblemUrl { .. })));
    }

    #[tokio::test]
    async fn test_structural_error_after_transient_keeps_history() {
        let calls = &AtomicUsize::new(0);
        let result: Result<()> = retry_operation(
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(ScrapeError::navigation_failed("https://example.com", "first transient timeout"))
                } else {
                    Err(ScrapeError::invalid_problem_url("https://example.com/structural"))
                }
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let err = result.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("first transient timeout"));
        assert!(msg.contains("https://example.com/structural"));
        match err {
            ScrapeError::RetryAborted { failures, cause } => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(*cause, ScrapeError::InvalidProblemUrl { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_retries_still_runs_once() {
        let calls = &AtomicUsize::new(0);
        let result = retry_operation(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ScrapeError>(7)
            },
            0,
            Duration::from_millis(1),
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
