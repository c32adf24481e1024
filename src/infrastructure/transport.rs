//! 传输层 - 基础设施层
//!
//! 负责与求解服务的一次请求/响应往返，不理解响应内容

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// 求解服务的接口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateTask,
    GetTaskResult,
    GetBalance,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::CreateTask => "createTask",
            Endpoint::GetTaskResult => "getTaskResult",
            Endpoint::GetBalance => "getBalance",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// 未解析的原始响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// 网络层错误（连接失败、超时、读取响应失败）
#[derive(Debug, Clone, Error)]
#[error("{endpoint} 请求失败: {message}")]
pub struct TransportError {
    pub endpoint: Endpoint,
    pub message: String,
}

impl TransportError {
    pub fn new(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            message: message.into(),
        }
    }
}

/// 传输能力
///
/// 职责：
/// - 把请求体发送到指定接口
/// - 原样返回状态码和响应文本
/// - 不解析 JSON，不重试
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, endpoint: Endpoint, payload: &JsonValue) -> Result<RawResponse, TransportError>;
}

/// 基于 reqwest 的 HTTP 传输
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// 创建新的 HTTP 传输
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, endpoint: Endpoint, payload: &JsonValue) -> Result<RawResponse, TransportError> {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::new(endpoint, e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(endpoint, e.to_string()))?;

        debug!("{} 返回 HTTP {}，响应长度: {} 字符", endpoint, status, body.len());

        Ok(RawResponse { status, body })
    }
}
