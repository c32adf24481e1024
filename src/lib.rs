//! # Captcha Solve
//!
//! 对接远程验证码求解服务的并发求解编排库
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 连接，只暴露能力
//! - `Transport` - 发送一次请求、返回原始响应，可替换为测试桩
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个任务
//! - `SessionStore` - 用户 → API key
//! - `JobClient` - 提交任务
//! - `PollLoop` - 唯一的轮询逻辑
//! - `ProgressReporter` - 进度估算
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个任务"的完整处理流程
//! - `JobCtx` - 上下文封装（spec_id + job_index）
//! - `SolveFlow` - 流程编排（submit → poll）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/facade` - 对外门面，解析凭证、处理取消
//! - `orchestrator/fan_out` - 批量并发求解
//! - `orchestrator/app` - 命令行应用
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod test_support;

// 重新导出常用类型
pub use config::Config;
pub use error::{MessageCategory, SolveError, SolveResult, SubmissionCause};
pub use infrastructure::{Endpoint, HttpTransport, RawResponse, Transport, TransportError};
pub use models::{
    Credential, ErrorDescriptor, FanOutResult, FanOutSlot, JobHandle, JobKind, JobSpec, ParamValue,
    PollOutcome, ProxyDescriptor, ProxyType,
};
pub use orchestrator::{App, Command, FanOutCoordinator, Orchestrator};
pub use services::{
    ExponentialBackoff, FixedInterval, HeuristicProgress, InMemorySessionStore, IntervalStrategy,
    PollPolicy, ProgressReporter, SessionStore,
};
pub use workflow::{JobCtx, SolveFlow};
