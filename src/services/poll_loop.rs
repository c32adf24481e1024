//! 轮询循环 - 业务能力层
//!
//! 所有入口共用的唯一一份轮询逻辑：
//! 1. 第一次查询立即发出，之后每次查询前等待策略给出的间隔
//! 2. 响应表示完成 → `Ready`
//! 3. 响应带明确错误 → 立即 `Failed`，不再消耗次数
//! 4. 网络 / 解析错误 → 视为处理中，继续下一次
//! 5. 用完 `max_attempts` 次仍未完成 → `TimedOut`

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::clients::SolverClient;
use crate::models::{Credential, JobHandle, PollOutcome};
use crate::services::progress::ProgressReporter;

/// 轮询间隔策略
pub trait IntervalStrategy: Send + Sync + fmt::Debug {
    /// 第 `attempt` 次查询（从 2 开始）之前的等待时间
    fn delay(&self, attempt: u32) -> Duration;
}

/// 固定间隔
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval(pub Duration);

impl IntervalStrategy for FixedInterval {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// 指数退避，间隔不超过 `max`
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub factor: f64,
    pub max: Duration,
}

impl IntervalStrategy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(2).min(32) as i32;
        let secs = self.base.as_secs_f64() * self.factor.max(1.0).powi(exponent);
        Duration::try_from_secs_f64(secs.min(self.max.as_secs_f64())).unwrap_or(self.max)
    }
}

/// 轮询策略：间隔 + 最大次数
#[derive(Debug, Clone)]
pub struct PollPolicy {
    strategy: Arc<dyn IntervalStrategy>,
    max_attempts: u32,
}

impl PollPolicy {
    /// 固定间隔策略（`max_attempts` 至少为 1）
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self::with_strategy(Arc::new(FixedInterval(interval)), max_attempts)
    }

    pub fn with_strategy(strategy: Arc<dyn IntervalStrategy>, max_attempts: u32) -> Self {
        Self {
            strategy,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.strategy.delay(attempt)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(2), 25)
    }
}

/// 轮询服务
#[derive(Clone)]
pub struct PollLoop {
    client: SolverClient,
    reporter: Arc<dyn ProgressReporter>,
}

impl PollLoop {
    pub fn new(client: SolverClient, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self { client, reporter }
    }

    /// 轮询直到终态
    ///
    /// 句柄按值传入，返回后不能再被轮询。
    pub async fn poll(&self, credential: &Credential, handle: JobHandle, policy: &PollPolicy) -> PollOutcome {
        let started = Instant::now();
        let max_attempts = policy.max_attempts();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                sleep(policy.delay_before(attempt)).await;
            }

            self.reporter.on_tick(&handle, attempt, started.elapsed());

            match self.client.task_status(credential, &handle).await {
                Ok(status) => {
                    if let Some(error) = status.error {
                        warn!("❌ 任务 {} 失败: {}", handle, error);
                        return PollOutcome::Failed(error);
                    }
                    if status.ready {
                        info!(
                            "✅ 任务 {} 完成（第 {} 次查询，耗时 {:.1}s）",
                            handle,
                            attempt,
                            started.elapsed().as_secs_f64()
                        );
                        return PollOutcome::Ready(status.solution.unwrap_or_default());
                    }
                    debug!("任务 {} 处理中 ({}/{})", handle, attempt, max_attempts);
                }
                Err(e) => {
                    warn!(
                        "⚠️ 任务 {} 第 {}/{} 次查询失败，稍后重试: {}",
                        handle, attempt, max_attempts, e
                    );
                }
            }
        }

        warn!(
            "⏰ 任务 {} 超时：{} 次查询后仍未完成（{:.1}s）",
            handle,
            max_attempts,
            started.elapsed().as_secs_f64()
        );
        PollOutcome::TimedOut {
            attempts: max_attempts,
        }
    }
}
