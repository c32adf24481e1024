//! 批量并发求解 - 编排层
//!
//! ## 职责
//!
//! 一次触发、多个任务：每个任务一个独立的 tokio 任务，同时提交、同时轮询，
//! 全部结束后按输入顺序汇总。
//!
//! ## 设计特点
//!
//! - **并发而非串行**：总耗时取决于最慢的任务，而不是所有任务之和
//! - **失败隔离**：一个任务失败只写进自己的槽位，不影响其他任务
//! - **按下标汇总**：结果顺序与输入一致，长度与输入相同
//! - **可取消**：取消后中止所有未完成的任务，丢弃部分结果

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::error::{SolveError, SolveResult};
use crate::models::{Credential, FanOutResult, FanOutSlot, JobSpec, PollOutcome};
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::{JobCtx, SolveFlow};

/// 批量协调器
#[derive(Clone)]
pub struct FanOutCoordinator {
    flow: SolveFlow,
    max_concurrent: usize,
}

impl FanOutCoordinator {
    pub fn new(flow: SolveFlow, max_concurrent: usize) -> Self {
        Self {
            flow,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 并发求解所有任务
    ///
    /// 只有取消会让整个调用失败；单个任务的错误都留在各自的槽位里。
    ///
    /// 同时运行的任务不超过 `max_concurrent` 个。任务数不超过该上限时，
    /// 总耗时约等于最慢的任务；超过时其余任务排队等待空位，总耗时按
    /// 轮数增长（约为 `ceil(total / max_concurrent)` 个最慢任务的耗时）。
    pub async fn run_all(
        &self,
        credential: &Credential,
        specs: Vec<JobSpec>,
        cancel: &CancellationToken,
    ) -> SolveResult<FanOutResult> {
        if cancel.is_cancelled() {
            return Err(SolveError::Cancelled);
        }

        let total = specs.len();
        if total == 0 {
            return Ok(FanOutResult::default());
        }

        log_batch_start(total, self.max_concurrent);
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        // 为每个任务创建并发任务
        let mut batch_handles: Vec<(String, JoinHandle<SolveResult<PollOutcome>>)> =
            Vec::with_capacity(total);
        for (idx, spec) in specs.into_iter().enumerate() {
            let ctx = JobCtx::new(spec.id(), idx + 1, total);
            let spec_id = ctx.spec_id.clone();
            let flow = self.flow.clone();
            let credential = credential.clone();
            let semaphore = semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| SolveError::Cancelled)?;
                flow.run(&ctx, &credential, &spec).await
            });
            batch_handles.push((spec_id, handle));
        }

        // 调用方放弃等待或取消时，中止所有未完成的任务
        let _guard = AbortOnDrop(batch_handles.iter().map(|(_, h)| h.abort_handle()).collect());

        let collect = async {
            let mut slots = Vec::with_capacity(total);
            for (index, (spec_id, handle)) in batch_handles.into_iter().enumerate() {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!("[任务 {}/{} #{}] 任务执行失败: {}", index + 1, total, spec_id, e);
                        Err(SolveError::TaskAborted { reason: e.to_string() })
                    }
                };
                slots.push(FanOutSlot {
                    index,
                    spec_id,
                    outcome,
                });
            }
            slots
        };

        let slots = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("🛑 批量求解已取消，丢弃未完成的 {} 个任务结果", total);
                return Err(SolveError::Cancelled);
            }
            slots = collect => slots,
        };

        let result = FanOutResult::from_slots(slots);
        log_batch_complete(result.ready_count(), total, started.elapsed().as_secs_f64());
        Ok(result)
    }
}

struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}
