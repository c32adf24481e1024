use thiserror::Error;

use crate::models::ErrorDescriptor;

/// 求解过程中的错误类型
///
/// 每一种终止状态都对应一个 [`MessageCategory`]，前端据此展示提示信息。
#[derive(Debug, Clone, Error)]
pub enum SolveError {
    /// 用户尚未提供 API key
    #[error("用户 {user_id} 没有可用的 API key")]
    MissingCredential { user_id: String },

    /// 任务提交失败（不会自动重试，调用方可以重新发起）
    #[error("任务提交失败: {cause}")]
    RemoteSubmission { cause: SubmissionCause },

    /// 一次性查询（如余额）时无法连接远程服务
    #[error("无法连接远程服务: {cause}")]
    Network { cause: String },

    /// 单次轮询失败（网络或解析问题），轮询循环会继续重试
    #[error("轮询暂时失败: {cause}")]
    TransientPoll { cause: String },

    /// 远程服务明确返回错误
    #[error("远程服务返回错误: {0}")]
    ExplicitRemoteFailure(ErrorDescriptor),

    /// 响应既不是 JSON，也不是可解码的嵌套 JSON 字符串
    #[error("无法解析的远程响应 (HTTP {status}): {raw}")]
    MalformedRemoteResponse { raw: String, status: u16 },

    /// 任务描述不完整，提交前即被拒绝
    #[error("任务 {kind} 参数无效: {reason}")]
    InvalidJobSpec { kind: String, reason: String },

    /// 批量中的某个任务异常退出（panic 或被中止）
    #[error("任务异常退出: {reason}")]
    TaskAborted { reason: String },

    /// 调用方取消了本次操作
    #[error("操作已取消")]
    Cancelled,
}

/// 提交失败的具体原因
#[derive(Debug, Clone, Error)]
pub enum SubmissionCause {
    /// 网络不可达、超时等传输层问题
    #[error("无法连接远程服务: {0}")]
    Unreachable(String),
    /// 远程服务拒绝了任务
    #[error("远程服务拒绝: {0}")]
    Rejected(ErrorDescriptor),
    /// 响应格式异常
    #[error("响应格式异常 (HTTP {status}): {raw}")]
    Malformed { raw: String, status: u16 },
}

/// 面向用户的提示类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCategory {
    MissingKey,
    NetworkIssue,
    RemoteRejected,
    TimedOut,
    MalformedResponse,
    Cancelled,
}

impl MessageCategory {
    /// 展示给最终用户的提示文本
    pub fn user_message(self) -> &'static str {
        match self {
            MessageCategory::MissingKey => {
                "⚠️ Please enter your API key first (Account → Enter your API key)."
            }
            MessageCategory::NetworkIssue => {
                "❌ Connection error: the solving service could not be reached. Please try again."
            }
            MessageCategory::RemoteRejected => "❌ The solving service rejected the request.",
            MessageCategory::TimedOut => {
                "⏳ The task is taking longer than expected. You can retry it."
            }
            MessageCategory::MalformedResponse => {
                "❌ The solving service returned an unexpected response."
            }
            MessageCategory::Cancelled => "🛑 The request was cancelled.",
        }
    }
}

impl SolveError {
    /// 错误对应的用户提示类别
    pub fn category(&self) -> MessageCategory {
        match self {
            SolveError::MissingCredential { .. } => MessageCategory::MissingKey,
            SolveError::RemoteSubmission { cause } => match cause {
                SubmissionCause::Unreachable(_) => MessageCategory::NetworkIssue,
                SubmissionCause::Rejected(_) => MessageCategory::RemoteRejected,
                SubmissionCause::Malformed { .. } => MessageCategory::MalformedResponse,
            },
            SolveError::Network { .. }
            | SolveError::TransientPoll { .. }
            | SolveError::TaskAborted { .. } => MessageCategory::NetworkIssue,
            SolveError::ExplicitRemoteFailure(_) => MessageCategory::RemoteRejected,
            SolveError::MalformedRemoteResponse { .. } => MessageCategory::MalformedResponse,
            SolveError::InvalidJobSpec { .. } => MessageCategory::RemoteRejected,
            SolveError::Cancelled => MessageCategory::Cancelled,
        }
    }

    /// 创建网络不可达的提交错误
    pub fn unreachable(source: impl std::fmt::Display) -> Self {
        SolveError::RemoteSubmission {
            cause: SubmissionCause::Unreachable(source.to_string()),
        }
    }

    /// 创建参数无效错误
    pub fn invalid_spec(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        SolveError::InvalidJobSpec {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 求解结果类型
pub type SolveResult<T> = Result<T, SolveError>;
