//! 重试策略
//!
//! 适配器调用的重试与指数退避，作为独立的策略对象注入到编排器中。
//! 每次尝试都受调用超时约束，超时按临时性失败处理。

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use crate::translation::error::{TranslationError, TranslationResult};

/// 重试策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含首次调用）
    pub max_attempts: usize,
    /// 首次重试前的等待时间
    pub base_delay: Duration,
    /// 每次重试后等待时间的倍数
    pub multiplier: u32,
    /// 单次调用超时，`None` 表示不限制
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    /// 3 次尝试，间隔 1s、2s；4s 只在 `max_attempts` 调大到 4 以上时出现
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
            attempt_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次失败（从0开始）后的等待时间: base * multiplier^attempt
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(attempt as u32)
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// 按策略执行操作
    ///
    /// 仅对可重试错误（网络、超时、限流）重试；明确拒绝的错误立即返回。
    /// 重试耗尽后返回最后一次的错误。
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> TranslationResult<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = TranslationResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let result = match self.attempt_timeout {
                Some(limit) => timeout(limit, operation(attempt))
                    .await
                    .unwrap_or_else(|elapsed| {
                        Err(TranslationError::from(elapsed)
                            .with_context(format!("{} {:.1}秒", label, limit.as_secs_f32())))
                    }),
                None => operation(attempt).await,
            };

            let error = match result {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!("{} 在第 {} 次重试后成功", label, attempt);
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            attempt += 1;

            if !error.is_retryable() {
                tracing::error!("{} 出现不可重试错误: {}", label, error);
                return Err(error);
            }

            if attempt >= max_attempts {
                tracing::warn!("{} 已尝试 {} 次，放弃: {}", label, attempt, error);
                return Err(error);
            }

            let delay = self.delay_for(attempt - 1);
            tracing::warn!(
                "{} 失败，{:.1}秒后重试 (尝试 {}/{}): {}",
                label,
                delay.as_secs_f32(),
                attempt + 1,
                max_attempts,
                error
            );
            sleep(delay).await;
        }
    }
}
