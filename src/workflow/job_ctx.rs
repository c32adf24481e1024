//! 任务处理上下文
//!
//! 封装"我正在处理这一批中的第几个任务"这一信息

use std::fmt::Display;

/// 任务处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// JobSpec 的 id
    pub spec_id: String,

    /// 在本批中的位置（从1开始，仅用于日志显示）
    pub job_index: usize,

    /// 本批任务总数
    pub total: usize,
}

impl JobCtx {
    /// 创建新的任务上下文
    pub fn new(spec_id: impl Into<String>, job_index: usize, total: usize) -> Self {
        Self {
            spec_id: spec_id.into(),
            job_index,
            total,
        }
    }

    /// 单任务调用使用的上下文
    pub fn single(spec_id: impl Into<String>) -> Self {
        Self::new(spec_id, 1, 1)
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[任务 {}/{} #{}]", self.job_index, self.total, self.spec_id)
    }
}
