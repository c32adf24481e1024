use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::services::poll_loop::PollPolicy;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 求解服务地址
    pub api_base_url: String,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 最大轮询次数
    pub max_poll_attempts: u32,
    /// 进度估算使用的预期轮询次数
    pub progress_expected_attempts: u32,
    /// 批量任务的最大并发数（超出部分排队，批量耗时随轮数增长）
    pub max_concurrent_jobs: usize,
    /// 命令行模式下使用的用户标识
    pub default_user_id: String,
    /// 命令行模式下预先写入的 API key
    pub client_key: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.capmonster.cloud".to_string(),
            request_timeout_secs: 30,
            poll_interval_ms: 2000,
            max_poll_attempts: 25,
            progress_expected_attempts: 25,
            max_concurrent_jobs: 64,
            default_user_id: "cli".to_string(),
            client_key: None,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// 从 TOML 文件加载，环境变量优先
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        Ok(config.overlay_env())
    }

    fn overlay_env(self) -> Self {
        Self {
            api_base_url: std::env::var("CAPMONSTER_API_BASE_URL").unwrap_or(self.api_base_url),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(self.request_timeout_secs),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS").unwrap_or(self.poll_interval_ms),
            max_poll_attempts: env_parse("MAX_POLL_ATTEMPTS").unwrap_or(self.max_poll_attempts),
            progress_expected_attempts: env_parse("PROGRESS_EXPECTED_ATTEMPTS").unwrap_or(self.progress_expected_attempts),
            max_concurrent_jobs: env_parse("MAX_CONCURRENT_JOBS").unwrap_or(self.max_concurrent_jobs),
            default_user_id: std::env::var("DEFAULT_USER_ID").unwrap_or(self.default_user_id),
            client_key: std::env::var("CAPMONSTER_CLIENT_KEY").ok().or(self.client_key),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 轮询策略（固定间隔）
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::fixed(
            Duration::from_millis(self.poll_interval_ms),
            self.max_poll_attempts,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
