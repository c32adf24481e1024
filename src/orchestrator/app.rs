//! 命令行应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是命令行程序的入口，负责应用生命周期和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：输出启动信息、创建编排器、写入预置的 API key
//! 2. **命令分发**：`balance` 查询余额，`solve <jobs.toml>` 批量求解
//! 3. **取消处理**：Ctrl-C 触发取消令牌，未完成的任务全部中止
//! 4. **全局统计**：汇总所有任务的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个任务的细节，全部委托给 [`Orchestrator`]
//! - **唯一用户**：命令行模式下所有操作都以 `default_user_id` 身份进行

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::SolveError;
use crate::models::{load_job_batch, FanOutResult, PollOutcome};
use crate::orchestrator::facade::Orchestrator;
use crate::utils::logging::{log_startup, print_final_stats};

const USAGE: &str = "用法: captcha_solve balance | captcha_solve solve <jobs.toml>";

/// 命令行子命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Balance,
    Solve { jobs_file: PathBuf },
}

impl Command {
    /// 解析命令行参数（不含程序名）
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        match args.as_slice() {
            [cmd] if cmd == "balance" => Ok(Command::Balance),
            [cmd, path] if cmd == "solve" => Ok(Command::Solve {
                jobs_file: PathBuf::from(path),
            }),
            _ => bail!("{}", USAGE),
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: Orchestrator,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let orchestrator = Orchestrator::from_config(&config)?;
        match &config.client_key {
            Some(key) => orchestrator.set_credential(&config.default_user_id, key).await,
            None => warn!("⚠️ 未设置 CAPMONSTER_CLIENT_KEY，请求将因缺少 API key 而失败"),
        }

        Ok(Self { config, orchestrator })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, command: Command) -> Result<()> {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("🛑 收到中断信号，正在取消...");
                trigger.cancel();
            }
        });

        match command {
            Command::Balance => self.show_balance().await,
            Command::Solve { jobs_file } => self.solve_file(&jobs_file, &cancel).await,
        }
    }

    async fn show_balance(&self) -> Result<()> {
        match self.orchestrator.balance_for(&self.config.default_user_id).await {
            Ok(balance) => {
                info!("💰 当前余额: {}", balance);
                Ok(())
            }
            Err(e) => {
                error!("{}", e.category().user_message());
                Err(e).context("余额查询失败")
            }
        }
    }

    async fn solve_file(&self, jobs_file: &Path, cancel: &CancellationToken) -> Result<()> {
        info!("\n📁 正在加载任务文件: {}", jobs_file.display());
        let specs = load_job_batch(jobs_file).await?;

        if specs.is_empty() {
            warn!("⚠️ 任务文件中没有任务，程序结束");
            return Ok(());
        }

        let result = match self
            .orchestrator
            .solve_all(&self.config.default_user_id, specs, cancel)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!("{}", e.category().user_message());
                return Err(e).context("批量求解失败");
            }
        };

        report_slots(&result);
        print_final_stats(
            result.ready_count(),
            result.len() - result.ready_count(),
            result.len(),
            &self.config.output_log_file,
        );
        Ok(())
    }
}

fn report_slots(result: &FanOutResult) {
    for slot in result.iter() {
        let label = format!("[任务 {}/{} #{}]", slot.index + 1, result.len(), slot.spec_id);
        match &slot.outcome {
            Ok(PollOutcome::Ready(solution)) => info!("{} ✅ {}", label, solution),
            Ok(other) => {
                let hint = other.category().map(|c| c.user_message()).unwrap_or_default();
                warn!("{} {}", label, hint);
            }
            Err(e) => warn!("{} {} ({})", label, e.category().user_message(), describe(e)),
        }
    }
}

fn describe(error: &SolveError) -> String {
    match error {
        SolveError::MalformedRemoteResponse { status, .. } => format!("HTTP {}", status),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(["balance"]).unwrap(), Command::Balance);
        assert_eq!(
            Command::parse(["solve", "jobs.toml"]).unwrap(),
            Command::Solve {
                jobs_file: PathBuf::from("jobs.toml")
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Command::parse(Vec::<String>::new()).is_err());
        assert!(Command::parse(["solve"]).is_err());
        assert!(Command::parse(["refund", "x"]).is_err());
    }
}
