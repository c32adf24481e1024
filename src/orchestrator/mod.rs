//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责凭证解析、并发调度和取消处理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `facade` - 对外门面
//! - 按用户取出凭证快照（缺失时不发出任何请求）
//! - `solve_one` / `solve_all` / `get_balance`
//!
//! ### `fan_out` - 批量协调器
//! - 每个任务一个 tokio 任务，并发提交与轮询
//! - 控制并发数量（Semaphore）
//! - 按输入顺序汇总结果，失败只影响自己的槽位
//!
//! ### `app` - 命令行应用
//! - 管理应用生命周期（初始化、运行）
//! - 加载任务文件、输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! app (命令行)
//!     ↓
//! facade::Orchestrator (凭证 + 取消)
//!     ↓
//! fan_out (处理 Vec<JobSpec>)
//!     ↓
//! workflow::SolveFlow (处理单个 JobSpec)
//!     ↓
//! services (能力层：submit / poll / progress / sessions)
//!     ↓
//! infrastructure (基础设施：Transport)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：fan_out 管批量，SolveFlow 管单个
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度和统计，不做具体的请求构造

pub mod app;
pub mod facade;
pub mod fan_out;

// 重新导出主要类型
pub use app::{App, Command};
pub use facade::Orchestrator;
pub use fan_out::FanOutCoordinator;
