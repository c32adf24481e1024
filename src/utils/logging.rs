//! 日志工具模块
//!
//! 提供日志初始化、格式化输出和敏感信息脱敏的辅助函数

use anyhow::{Context, Result};
use regex::Regex;
use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::sync::{Mutex, OnceLock};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// 初始化日志：终端输出 + 追加写入日志文件
///
/// `RUST_LOG` 优先；否则按 `verbose_logging` 选择 debug 或 info。
pub fn init(config: &Config) -> Result<()> {
    init_log_file(&config.output_log_file)?;

    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = OpenOptions::new()
        .append(true)
        .open(&config.output_log_file)
        .with_context(|| format!("无法打开日志文件: {}", config.output_log_file))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)))
        .try_init()
        .context("日志系统已初始化")?;

    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n任务求解日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并发求解模式");
    info!("🌐 服务地址: {}", config.api_base_url);
    info!(
        "⏱️ 轮询间隔: {}ms，最多 {} 次",
        config.poll_interval_ms, config.max_poll_attempts
    );
    info!("📊 最大并发数: {}", config.max_concurrent_jobs);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `total`: 任务总数
/// - `max_concurrent`: 最大并发数
pub fn log_batch_start(total: usize, max_concurrent: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始并发处理 {} 个任务", total);
    info!("📋 最大并发数: {}", max_concurrent.min(total.max(1)));
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `success`: 成功数量
/// - `total`: 任务总数
/// - `elapsed_secs`: 总耗时（秒）
pub fn log_batch_complete(success: usize, total: usize, elapsed_secs: f64) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 批次完成: 成功 {}/{}，耗时 {:.1}s", success, total, elapsed_secs);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 抹掉 JSON 文本中的 API key 和代理密码
pub fn redact_secrets(text: &str) -> Cow<'_, str> {
    static SECRET_FIELD: OnceLock<Option<Regex>> = OnceLock::new();

    let re = SECRET_FIELD.get_or_init(|| {
        Regex::new(r#""(clientKey|proxyPassword)"\s*:\s*"[^"]*""#).ok()
    });

    match re {
        Some(re) => re.replace_all(text, r#""$1":"[REDACTED]""#),
        None => Cow::Borrowed(text),
    }
}
