use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use captcha_solve::{
    Config, Credential, Endpoint, InMemorySessionStore, JobKind, JobSpec, MessageCategory, Orchestrator,
    PollOutcome, RawResponse, SolveError, Transport, TransportError,
};
use serde_json::{json, Value};
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

const INTERVAL: Duration = Duration::from_secs(2);

type PollScript = Box<dyn Fn(u64, u32) -> RawResponse + Send + Sync>;

/// 按 taskId 和查询次数应答的传输层
struct ScriptedTransport {
    next_id: AtomicU64,
    poll: PollScript,
    balance: Option<RawResponse>,
    attempts: Mutex<HashMap<u64, u32>>,
    calls: Mutex<Vec<(Endpoint, Value)>>,
}

impl ScriptedTransport {
    fn new(poll: impl Fn(u64, u32) -> RawResponse + Send + Sync + 'static) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            poll: Box::new(poll),
            balance: None,
            attempts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_balance(mut self, response: RawResponse) -> Self {
        self.balance = Some(response);
        self
    }

    fn count(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().unwrap().iter().filter(|(e, _)| *e == endpoint).count()
    }

    fn client_keys(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| payload["clientKey"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, endpoint: Endpoint, payload: &Value) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push((endpoint, payload.clone()));
        match endpoint {
            Endpoint::CreateTask => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                Ok(RawResponse::new(200, json!({"errorId": 0, "taskId": id}).to_string()))
            }
            Endpoint::GetTaskResult => {
                let task_id = payload["taskId"].as_u64().unwrap_or_default();
                let attempt = {
                    let mut attempts = self.attempts.lock().unwrap();
                    let n = attempts.entry(task_id).or_insert(0);
                    *n += 1;
                    *n
                };
                Ok((self.poll)(task_id, attempt))
            }
            Endpoint::GetBalance => Ok(self
                .balance
                .clone()
                .unwrap_or_else(|| RawResponse::new(200, r#"{"errorId":0,"balance":12.5}"#))),
        }
    }
}

fn processing() -> RawResponse {
    RawResponse::new(200, r#"{"errorId":0,"status":"processing"}"#)
}

fn ready(text: &str) -> RawResponse {
    RawResponse::new(
        200,
        json!({"errorId": 0, "status": "ready", "solution": {"text": text}}).to_string(),
    )
}

fn orchestrator(transport: Arc<ScriptedTransport>, max_attempts: u32) -> Orchestrator {
    let config = Config {
        poll_interval_ms: INTERVAL.as_millis() as u64,
        max_poll_attempts: max_attempts,
        ..Config::default()
    };
    Orchestrator::new(&config, transport, Arc::new(InMemorySessionStore::new()))
}

fn image_spec(id: &str) -> JobSpec {
    JobSpec::new(id, JobKind::ImageToText).param("body", vec![0x89u8, 0x50, 0x4e, 0x47])
}

#[tokio::test(start_paused = true)]
async fn test_ready_on_third_poll() {
    let transport = Arc::new(ScriptedTransport::new(|_, attempt| {
        if attempt < 3 { processing() } else { ready("xyz") }
    }));
    let orchestrator = orchestrator(transport.clone(), 25);
    orchestrator.set_credential("alice", "key").await;

    let started = Instant::now();
    let outcome = assert_ok!(
        orchestrator
            .solve_one("alice", &image_spec("img"), &CancellationToken::new())
            .await
    );
    let elapsed = started.elapsed();

    assert_eq!(outcome, PollOutcome::Ready(json!({"text": "xyz"})));
    assert_eq!(transport.count(Endpoint::GetTaskResult), 3);
    assert!(elapsed >= INTERVAL * 2 && elapsed < INTERVAL * 3);
}

#[tokio::test(start_paused = true)]
async fn test_never_ready_times_out() {
    let transport = Arc::new(ScriptedTransport::new(|_, _| processing()));
    let orchestrator = orchestrator(transport.clone(), 7);
    orchestrator.set_credential("alice", "key").await;

    let outcome = assert_ok!(
        orchestrator
            .solve_one("alice", &image_spec("img"), &CancellationToken::new())
            .await
    );

    assert_eq!(outcome, PollOutcome::TimedOut { attempts: 7 });
    assert_eq!(outcome.category(), Some(MessageCategory::TimedOut));
    assert_eq!(transport.count(Endpoint::GetTaskResult), 7);
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_failure_isolated_and_concurrent() {
    // 任务 3 明确失败，其余任务在第 3 次查询时完成
    let transport = Arc::new(ScriptedTransport::new(|task_id, attempt| {
        if task_id == 3 && attempt == 2 {
            RawResponse::new(200, r#"{"errorId":1,"errorCode":"ERROR_CAPTCHA_UNSOLVABLE"}"#)
        } else if attempt < 3 {
            processing()
        } else {
            ready("ok")
        }
    }));
    let orchestrator = orchestrator(transport.clone(), 25);
    orchestrator.set_credential("alice", "key").await;

    let specs: Vec<JobSpec> = (1..=5).map(|i| image_spec(&format!("img-{}", i))).collect();

    let started = Instant::now();
    let result = assert_ok!(
        orchestrator
            .solve_all("alice", specs, &CancellationToken::new())
            .await
    );
    let elapsed = started.elapsed();

    assert_eq!(result.len(), 5);
    for (i, slot) in result.iter().enumerate() {
        assert_eq!(slot.spec_id, format!("img-{}", i + 1));
        match (i, &slot.outcome) {
            (2, Ok(PollOutcome::Failed(desc))) => assert_eq!(desc.code, "ERROR_CAPTCHA_UNSOLVABLE"),
            (2, other) => panic!("slot 2 should fail, got {:?}", other),
            (_, outcome) => assert!(matches!(outcome, Ok(PollOutcome::Ready(_)))),
        }
    }
    assert_eq!(result.ready_count(), 4);
    // 并发：耗时约等于最慢的任务，而不是五个任务之和
    assert!(elapsed < INTERVAL * 3, "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_overwritten_credential_is_used() {
    let transport = Arc::new(ScriptedTransport::new(|_, _| ready("ok")));
    let orchestrator = orchestrator(transport.clone(), 25);

    orchestrator.set_credential("alice", "k1").await;
    orchestrator.set_credential("alice", " k2 ").await;

    assert_ok!(
        orchestrator
            .solve_one("alice", &image_spec("img"), &CancellationToken::new())
            .await
    );
    assert!(transport.client_keys().iter().all(|k| k == "k2"));
}

#[tokio::test(start_paused = true)]
async fn test_credential_change_mid_solve_keeps_snapshot() {
    // 第 4 次查询完成；3s 时（第 2、3 次查询之间）用户换了新 key
    let transport = Arc::new(ScriptedTransport::new(|_, attempt| {
        if attempt < 4 { processing() } else { ready("ok") }
    }));
    let orchestrator = orchestrator(transport.clone(), 25);
    orchestrator.set_credential("alice", "old").await;

    let updater = orchestrator.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        updater.set_credential("alice", "new").await;
    });

    assert_ok!(
        orchestrator
            .solve_one("alice", &image_spec("img"), &CancellationToken::new())
            .await
    );

    let keys = transport.client_keys();
    assert_eq!(keys.len(), 5);
    assert!(keys.iter().all(|k| k == "old"), "keys {:?}", keys);

    // 之后的操作使用新 key
    assert_ok!(orchestrator.balance_for("alice").await);
    assert_eq!(transport.client_keys().last().map(String::as_str), Some("new"));
}

#[tokio::test]
async fn test_unknown_user_no_network_calls() {
    let transport = Arc::new(ScriptedTransport::new(|_, _| ready("ok")));
    let orchestrator = orchestrator(transport.clone(), 25);

    let err = assert_err!(
        orchestrator
            .solve_one("mallory", &image_spec("img"), &CancellationToken::new())
            .await
    );

    assert!(matches!(err, SolveError::MissingCredential { .. }));
    assert_eq!(err.category(), MessageCategory::MissingKey);
    assert!(transport.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_balance_malformed_response() {
    let transport =
        Arc::new(ScriptedTransport::new(|_, _| processing()).with_balance(RawResponse::new(500, "not-json-at-all")));
    let orchestrator = orchestrator(transport, 25);

    let err = assert_err!(orchestrator.get_balance(&Credential::new("key")).await);
    match err {
        SolveError::MalformedRemoteResponse { raw, status } => {
            assert_eq!(raw, "not-json-at-all");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_balance_nested_json_string() {
    let nested = serde_json::to_string(r#"{"errorId":0,"balance":3.25}"#).unwrap();
    let transport = Arc::new(ScriptedTransport::new(|_, _| processing()).with_balance(RawResponse::new(200, nested)));
    let orchestrator = orchestrator(transport, 25);

    let balance = assert_ok!(orchestrator.get_balance(&Credential::new("key")).await);
    assert_eq!(balance, 3.25);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_batch_stops_polling() {
    let transport = Arc::new(ScriptedTransport::new(|_, _| processing()));
    let orchestrator = orchestrator(transport.clone(), 25);
    orchestrator.set_credential("alice", "key").await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(INTERVAL * 2 + Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let specs: Vec<JobSpec> = (1..=3).map(|i| image_spec(&format!("img-{}", i))).collect();
    let err = assert_err!(orchestrator.solve_all("alice", specs, &cancel).await);
    assert!(matches!(err, SolveError::Cancelled));

    // 每个任务在 0s、2s、4s 各查询一次，4.5s 时取消
    assert_eq!(transport.count(Endpoint::GetTaskResult), 9);
    tokio::time::sleep(INTERVAL * 20).await;
    assert_eq!(transport.count(Endpoint::GetTaskResult), 9);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_balance() {
    // 加载配置
    let config = Config::from_env();
    let key = config.client_key.clone().expect("需要设置 CAPMONSTER_CLIENT_KEY");

    let orchestrator = Orchestrator::from_config(&config).expect("创建编排器失败");
    let balance = orchestrator
        .get_balance(&Credential::new(&key))
        .await
        .expect("查询余额失败");

    assert!(balance >= 0.0, "余额不应为负数");
}
