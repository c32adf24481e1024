/// 求解服务 API 客户端
///
/// 封装 createTask / getTaskResult / getBalance 三个接口的请求体构建和响应解析
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::clients::envelope::{decode_envelope, error_descriptor};
use crate::error::{SolveError, SolveResult, SubmissionCause};
use crate::infrastructure::{Endpoint, RawResponse, Transport};
use crate::models::{Credential, ErrorDescriptor, JobHandle};
use crate::utils::{redact_secrets, truncate_text};

/// 单次 getTaskResult 的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatus {
    pub ready: bool,
    pub error: Option<ErrorDescriptor>,
    pub solution: Option<JsonValue>,
}

/// 求解服务客户端
#[derive(Clone)]
pub struct SolverClient {
    transport: Arc<dyn Transport>,
}

impl SolverClient {
    /// 创建新的客户端
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// 创建任务
    ///
    /// # 参数
    /// - `credential`: 用户 API key
    /// - `task`: 已转换好的任务对象
    ///
    /// # 返回
    /// 返回任务句柄
    pub async fn create_task(&self, credential: &Credential, task: JsonValue) -> SolveResult<JobHandle> {
        let payload = json!({
            "clientKey": credential.expose(),
            "task": task,
        });

        let raw = self
            .transport
            .send(Endpoint::CreateTask, &payload)
            .await
            .map_err(SolveError::unreachable)?;

        let body = decode_envelope(&raw).map_err(|_| {
            log_malformed(Endpoint::CreateTask, &raw);
            SolveError::RemoteSubmission {
                cause: SubmissionCause::Malformed {
                    raw: raw.body.clone(),
                    status: raw.status,
                },
            }
        })?;

        if let Some(descriptor) = error_descriptor(&body) {
            return Err(SolveError::RemoteSubmission {
                cause: SubmissionCause::Rejected(descriptor),
            });
        }

        let task_id = match body.get("taskId") {
            Some(JsonValue::Number(n)) => n.to_string(),
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                log_malformed(Endpoint::CreateTask, &raw);
                return Err(SolveError::RemoteSubmission {
                    cause: SubmissionCause::Malformed {
                        raw: raw.body,
                        status: raw.status,
                    },
                });
            }
        };

        Ok(JobHandle::new(task_id))
    }

    /// 查询任务状态
    ///
    /// 网络错误和无法解析的响应都返回 `TransientPoll`，由轮询循环决定是否继续。
    pub async fn task_status(&self, credential: &Credential, handle: &JobHandle) -> SolveResult<TaskStatus> {
        let payload = json!({
            "clientKey": credential.expose(),
            "taskId": handle.to_wire(),
        });

        let raw = self
            .transport
            .send(Endpoint::GetTaskResult, &payload)
            .await
            .map_err(|e| SolveError::TransientPoll { cause: e.to_string() })?;

        let body = decode_envelope(&raw).map_err(|_| {
            log_malformed(Endpoint::GetTaskResult, &raw);
            SolveError::TransientPoll {
                cause: format!("HTTP {} 响应无法解析", raw.status),
            }
        })?;

        if let Some(descriptor) = error_descriptor(&body) {
            return Ok(TaskStatus {
                ready: false,
                error: Some(descriptor),
                solution: None,
            });
        }

        let status = body.get("status").and_then(|v| v.as_str()).unwrap_or("");
        if status != "ready" && status != "processing" {
            debug!("任务 {} 返回未知状态 '{}'，按处理中对待", handle, status);
        }

        Ok(TaskStatus {
            ready: status == "ready",
            error: None,
            solution: body.get("solution").cloned(),
        })
    }

    /// 查询账户余额
    pub async fn balance(&self, credential: &Credential) -> SolveResult<f64> {
        let payload = json!({ "clientKey": credential.expose() });

        let raw = self
            .transport
            .send(Endpoint::GetBalance, &payload)
            .await
            .map_err(|e| SolveError::Network { cause: e.to_string() })?;

        let body = decode_envelope(&raw).map_err(|e| {
            log_malformed(Endpoint::GetBalance, &raw);
            e
        })?;

        if let Some(descriptor) = error_descriptor(&body) {
            return Err(SolveError::ExplicitRemoteFailure(descriptor));
        }

        body.get("balance").and_then(|v| v.as_f64()).ok_or_else(|| {
            log_malformed(Endpoint::GetBalance, &raw);
            SolveError::MalformedRemoteResponse {
                raw: raw.body.clone(),
                status: raw.status,
            }
        })
    }
}

fn log_malformed(endpoint: Endpoint, raw: &RawResponse) {
    warn!(
        "⚠️ {} 返回无法解析的响应 (HTTP {}): {}",
        endpoint,
        raw.status,
        truncate_text(&redact_secrets(&raw.body), 200)
    );
}
