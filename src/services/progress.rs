//! 进度估算 - 业务能力层
//!
//! 远程服务不提供真实的完成比例。这里给出的百分比只根据轮询次数估算，
//! 是一个近似值，前端展示时不能当作真实进度。

use std::time::Duration;

use tracing::debug;

use crate::models::JobHandle;

/// 进度回调
///
/// 每次轮询前调用一次，返回估算的百分比（0-100）。
/// 前端可以实现该 trait，把进度刷新到自己的界面上。
pub trait ProgressReporter: Send + Sync {
    fn on_tick(&self, handle: &JobHandle, attempt: u32, elapsed: Duration) -> u8;
}

/// 按轮询次数估算进度
///
/// `min(99, attempt * 100 / expected_attempts)`，随轮询次数单调不减；
/// 到达 100 只代表任务真正完成，由调用方在拿到结果后自行展示。
#[derive(Debug, Clone, Copy)]
pub struct HeuristicProgress {
    expected_attempts: u32,
}

impl HeuristicProgress {
    pub fn new(expected_attempts: u32) -> Self {
        Self {
            expected_attempts: expected_attempts.max(1),
        }
    }

    /// 估算百分比
    pub fn percent(&self, attempt: u32) -> u8 {
        let pct = u64::from(attempt) * 100 / u64::from(self.expected_attempts);
        pct.min(99) as u8
    }
}

impl ProgressReporter for HeuristicProgress {
    fn on_tick(&self, handle: &JobHandle, attempt: u32, elapsed: Duration) -> u8 {
        let pct = self.percent(attempt);
        debug!(
            "⏳ 任务 {} 第 {} 次查询，已等待 {:.1}s，估算进度 ~{}%",
            handle,
            attempt,
            elapsed.as_secs_f64(),
            pct
        );
        pct
    }
}
