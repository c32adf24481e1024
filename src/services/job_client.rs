//! 任务提交 - 业务能力层
//!
//! 只负责"提交一个任务"，恰好一次请求，不重试

use tracing::{debug, info};

use crate::clients::SolverClient;
use crate::error::SolveResult;
use crate::models::{Credential, JobHandle, JobSpec};
use crate::services::task_mapping::to_wire_task;

/// 任务提交服务
#[derive(Clone)]
pub struct JobClient {
    client: SolverClient,
}

impl JobClient {
    pub fn new(client: SolverClient) -> Self {
        Self { client }
    }

    /// 提交任务
    ///
    /// 参数不完整时不会发出任何请求。
    pub async fn submit(&self, credential: &Credential, spec: &JobSpec) -> SolveResult<JobHandle> {
        let task = to_wire_task(spec)?;
        debug!("提交任务 {} ({})", spec.id(), spec.kind());

        let handle = self.client.create_task(credential, task).await?;
        info!("📤 任务 {} 已提交，句柄 {}", spec.id(), handle);
        Ok(handle)
    }
}
