//! 单任务求解流程 - 流程层
//!
//! 核心职责：定义"一个任务"的完整处理流程
//!
//! 流程顺序：
//! 1. JobClient 提交 → 得到句柄
//! 2. PollLoop 轮询 → 得到终态
//!
//! `solve_one` 和批量中的每一个槽位都走这一份流程。

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::SolverClient;
use crate::error::SolveResult;
use crate::models::{Credential, JobSpec, PollOutcome};
use crate::services::{JobClient, PollLoop, PollPolicy, ProgressReporter};
use crate::workflow::job_ctx::JobCtx;

/// 单任务求解流程
///
/// - 不持有凭证，凭证由调用方在操作开始时取出快照
/// - 不处理并发和取消，由编排层负责
#[derive(Clone)]
pub struct SolveFlow {
    job_client: JobClient,
    poll_loop: PollLoop,
    policy: PollPolicy,
}

impl SolveFlow {
    /// 创建新的求解流程
    pub fn new(client: SolverClient, reporter: Arc<dyn ProgressReporter>, policy: PollPolicy) -> Self {
        Self {
            job_client: JobClient::new(client.clone()),
            poll_loop: PollLoop::new(client, reporter),
            policy,
        }
    }

    pub async fn run(&self, ctx: &JobCtx, credential: &Credential, spec: &JobSpec) -> SolveResult<PollOutcome> {
        info!("{} 🔍 开始求解 {}", ctx, spec.kind());

        let handle = match self.job_client.submit(credential, spec).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("{} ❌ 提交失败: {}", ctx, e);
                return Err(e);
            }
        };

        let outcome = self.poll_loop.poll(credential, handle, &self.policy).await;

        match &outcome {
            PollOutcome::Ready(_) => info!("{} ✓ 求解成功", ctx),
            PollOutcome::Failed(error) => warn!("{} ⚠️ 远程服务报告失败: {}", ctx, error),
            PollOutcome::TimedOut { attempts } => {
                warn!("{} ⚠️ {} 次查询后仍未完成", ctx, attempts)
            }
            PollOutcome::Pending => {}
        }

        Ok(outcome)
    }
}
