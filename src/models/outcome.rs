//! 任务句柄、轮询结果与批量结果

use std::fmt;

use serde_json::Value;

use crate::error::{MessageCategory, SolveResult};

/// 远程服务返回的错误描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub error_id: i64,
    pub code: String,
    pub description: Option<String>,
}

impl ErrorDescriptor {
    pub fn new(error_id: i64, code: impl Into<String>) -> Self {
        Self {
            error_id,
            code: code.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "{} ({})", self.code, desc),
            None => f.write_str(&self.code),
        }
    }
}

/// 提交后远程服务返回的任务句柄
///
/// 只能被轮询一次：`PollLoop::poll` 按值接收句柄。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    id: String,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 请求体中的 taskId：数字 id 按数字发送
    pub fn to_wire(&self) -> Value {
        match self.id.parse::<u64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::from(self.id.clone()),
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// 轮询结果
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// 已完成，携带 solution
    Ready(Value),
    /// 仍在处理中（单次轮询的观察结果，`PollLoop::poll` 不会返回它）
    Pending,
    /// 远程服务明确报告失败
    Failed(ErrorDescriptor),
    /// 轮询次数耗尽
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready(_))
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollOutcome::Pending)
    }

    /// 非成功终态对应的用户提示类别
    pub fn category(&self) -> Option<MessageCategory> {
        match self {
            PollOutcome::Failed(_) => Some(MessageCategory::RemoteRejected),
            PollOutcome::TimedOut { .. } => Some(MessageCategory::TimedOut),
            PollOutcome::Ready(_) | PollOutcome::Pending => None,
        }
    }
}

/// 批量结果中的一个槽位
#[derive(Debug, Clone)]
pub struct FanOutSlot {
    /// 在输入列表中的位置
    pub index: usize,
    /// 对应 JobSpec 的 id
    pub spec_id: String,
    pub outcome: SolveResult<PollOutcome>,
}

impl FanOutSlot {
    pub fn is_ready(&self) -> bool {
        matches!(&self.outcome, Ok(outcome) if outcome.is_ready())
    }
}

/// 批量结果，顺序与输入一致，长度等于输入数量
#[derive(Debug, Clone, Default)]
pub struct FanOutResult {
    slots: Vec<FanOutSlot>,
}

impl FanOutResult {
    pub(crate) fn from_slots(slots: Vec<FanOutSlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[FanOutSlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &FanOutSlot> {
        self.slots.iter()
    }

    pub fn ready_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_ready()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.len() - self.ready_count()
    }
}
