//! 单元测试用的脚本化传输层

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::infrastructure::{Endpoint, RawResponse, Transport, TransportError};

type CreateFn = Box<dyn Fn(&JsonValue) -> Result<RawResponse, TransportError> + Send + Sync>;
type PollFn = Box<dyn Fn(&str, u32) -> Result<RawResponse, TransportError> + Send + Sync>;
type BalanceFn = Box<dyn Fn() -> Result<RawResponse, TransportError> + Send + Sync>;

/// 按脚本应答的传输层，记录所有请求
pub(crate) struct StubTransport {
    next_task_id: AtomicU64,
    create: Option<CreateFn>,
    poll: Option<PollFn>,
    balance: Option<BalanceFn>,
    poll_counts: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<(Endpoint, JsonValue)>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self {
            next_task_id: AtomicU64::new(1),
            create: None,
            poll: None,
            balance: None,
            poll_counts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// createTask 的应答，参数是 task 对象
    pub fn on_create(
        mut self,
        f: impl Fn(&JsonValue) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        self.create = Some(Box::new(f));
        self
    }

    /// getTaskResult 的应答，参数是 taskId 和该任务第几次被轮询（从 1 开始）
    pub fn on_poll(
        mut self,
        f: impl Fn(&str, u32) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        self.poll = Some(Box::new(f));
        self
    }

    pub fn on_balance(
        mut self,
        f: impl Fn() -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        self.balance = Some(Box::new(f));
        self
    }

    pub fn network_error(endpoint: Endpoint) -> TransportError {
        TransportError::new(endpoint, "connection reset by peer")
    }

    pub fn processing() -> Result<RawResponse, TransportError> {
        Ok(RawResponse::new(200, r#"{"errorId":0,"status":"processing"}"#))
    }

    pub fn ready(text: &str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse::new(
            200,
            format!(
                r#"{{"errorId":0,"status":"ready","solution":{{"text":"{}"}}}}"#,
                text
            ),
        ))
    }

    pub fn calls(&self) -> Vec<(Endpoint, JsonValue)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, endpoint: Endpoint, payload: &JsonValue) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push((endpoint, payload.clone()));

        match endpoint {
            Endpoint::CreateTask => match &self.create {
                Some(f) => f(&payload["task"]),
                None => {
                    let id = self.next_task_id.fetch_add(1, Ordering::SeqCst);
                    Ok(RawResponse::new(200, format!(r#"{{"errorId":0,"taskId":{}}}"#, id)))
                }
            },
            Endpoint::GetTaskResult => {
                let task_id = match &payload["taskId"] {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let attempt = {
                    let mut counts = self.poll_counts.lock().unwrap();
                    let count = counts.entry(task_id.clone()).or_insert(0);
                    *count += 1;
                    *count
                };
                match &self.poll {
                    Some(f) => f(&task_id, attempt),
                    None => Self::ready("ok"),
                }
            }
            Endpoint::GetBalance => match &self.balance {
                Some(f) => f(),
                None => Ok(RawResponse::new(200, r#"{"errorId":0,"balance":1.0}"#)),
            },
        }
    }
}
