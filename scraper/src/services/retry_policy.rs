//! 重试策略
//!
//! 只对平台限流做指数退避重试;登录墙、错误页、不存在等结构性失败立即返回,
//! 由批量调度器记录为任务失败。

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::models::{RetryPolicyConfig, ScrapeError};

/// 可判断是否值得重试的错误
pub trait RetryableError {
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ScrapeError {
    fn is_retryable(&self) -> bool {
        self.is_rate_limited()
    }
}

/// 第 `attempt` 次重试前的退避时长 (attempt 从 0 开始)
///
/// backoffDelay × backoffMultiplier^attempt,默认 5s / 10s / 20s
pub fn backoff_delay(config: &RetryPolicyConfig, attempt: u32) -> Duration {
    let millis = config.backoff_delay_ms as f64 * config.backoff_multiplier.powi(attempt as i32);
    Duration::from_millis(millis.round() as u64)
}

/// 执行操作,限流时按指数退避重试
///
/// 首次尝试之后最多重试 `max_retries` 次;
/// 非限流错误立即返回,不等待也不重试;重试耗尽后返回最后一次的限流错误。
pub async fn with_retry<T, E, F, Fut>(config: &RetryPolicyConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + Display,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let delay = backoff_delay(config, attempt);
                tracing::warn!(
                    重试次数 = attempt + 1,
                    最大重试次数 = config.max_retries,
                    延迟毫秒 = delay.as_millis() as u64,
                    错误 = %e,
                    "触发限流,退避后重试"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(重试次数 = attempt, 错误 = %e, "限流重试已耗尽");
                }
                return Err(e);
            }
        }
    }
}

/// 礼貌延迟: requestDelay 加上至多一半的随机抖动
pub fn polite_delay(config: &RetryPolicyConfig) -> Duration {
    let base = config.request_delay_ms;
    let jitter = rand::thread_rng().gen_range(0..=base / 2);
    Duration::from_millis(base + jitter)
}
