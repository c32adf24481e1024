//! 对外门面 - 编排层
//!
//! 所有前端（命令行、聊天机器人等）只通过 [`Orchestrator`] 调用求解能力：
//! 先按用户取出凭证快照，再交给单任务流程或批量协调器。

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::clients::SolverClient;
use crate::config::Config;
use crate::error::{SolveError, SolveResult};
use crate::infrastructure::{HttpTransport, Transport};
use crate::models::{Credential, FanOutResult, JobSpec, PollOutcome};
use crate::orchestrator::fan_out::FanOutCoordinator;
use crate::services::{HeuristicProgress, InMemorySessionStore, ProgressReporter, SessionStore};
use crate::workflow::{JobCtx, SolveFlow};

/// 求解编排器
#[derive(Clone)]
pub struct Orchestrator {
    sessions: Arc<dyn SessionStore>,
    client: SolverClient,
    flow: SolveFlow,
    fan_out: FanOutCoordinator,
}

impl Orchestrator {
    /// 使用默认的启发式进度估算
    pub fn new(config: &Config, transport: Arc<dyn Transport>, sessions: Arc<dyn SessionStore>) -> Self {
        let reporter = Arc::new(HeuristicProgress::new(config.progress_expected_attempts));
        Self::with_progress(config, transport, sessions, reporter)
    }

    pub fn with_progress(
        config: &Config,
        transport: Arc<dyn Transport>,
        sessions: Arc<dyn SessionStore>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        let client = SolverClient::new(transport);
        let flow = SolveFlow::new(client.clone(), reporter, config.poll_policy());
        let fan_out = FanOutCoordinator::new(flow.clone(), config.max_concurrent_jobs);

        Self {
            sessions,
            client,
            flow,
            fan_out,
        }
    }

    /// HTTP 传输 + 内存会话存储
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config).context("无法创建 HTTP 客户端")?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            Arc::new(InMemorySessionStore::new()),
        ))
    }

    /// 保存用户的 API key（去除首尾空白，覆盖旧值）
    pub async fn set_credential(&self, user_id: &str, raw: &str) {
        self.sessions.set(user_id, Credential::new(raw)).await;
        info!("🔑 用户 {} 已设置 API key", user_id);
    }

    /// 求解单个任务
    ///
    /// 没有凭证时直接返回 `MissingCredential`，不会发出任何请求。
    pub async fn solve_one(
        &self,
        user_id: &str,
        spec: &JobSpec,
        cancel: &CancellationToken,
    ) -> SolveResult<PollOutcome> {
        let credential = self.credential(user_id).await?;
        if cancel.is_cancelled() {
            return Err(SolveError::Cancelled);
        }

        let ctx = JobCtx::single(spec.id());
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("{} 🛑 已取消", ctx);
                Err(SolveError::Cancelled)
            }
            outcome = self.flow.run(&ctx, &credential, spec) => outcome,
        }
    }

    /// 并发求解一批任务，结果与输入一一对应
    pub async fn solve_all(
        &self,
        user_id: &str,
        specs: Vec<JobSpec>,
        cancel: &CancellationToken,
    ) -> SolveResult<FanOutResult> {
        let credential = self.credential(user_id).await?;
        self.fan_out.run_all(&credential, specs, cancel).await
    }

    /// 查询余额（一次请求，不轮询）
    pub async fn get_balance(&self, credential: &Credential) -> SolveResult<f64> {
        self.client.balance(credential).await
    }

    /// 按用户查询余额
    pub async fn balance_for(&self, user_id: &str) -> SolveResult<f64> {
        let credential = self.credential(user_id).await?;
        let balance = self.get_balance(&credential).await?;
        info!("💰 用户 {} 当前余额: {}", user_id, balance);
        Ok(balance)
    }

    async fn credential(&self, user_id: &str) -> SolveResult<Credential> {
        self.sessions.get(user_id).await.ok_or_else(|| {
            warn!("⚠️ 用户 {} 尚未设置 API key", user_id);
            SolveError::MissingCredential {
                user_id: user_id.to_string(),
            }
        })
    }
}
