//! JobSpec → 远程任务对象的纯映射

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{Map, Value as JsonValue};

use crate::error::{SolveError, SolveResult};
use crate::models::{JobKind, JobSpec, ParamValue};

const METADATA_PREFIX: &str = "metadata.";
const PROXY_PREFIX: &str = "proxy";

/// 把任务描述转换为 createTask 请求中的 `task` 对象
///
/// - `type` 取自任务类型，CustomTask 额外带 `class`
/// - `metadata.xxx` 参数合并进 `metadata` 对象
/// - 二进制参数编码为 base64
/// - 代理展开为 `proxyType` / `proxyAddress` / `proxyPort` / `proxyLogin` / `proxyPassword`
///
/// 参数名与上述字段冲突时直接拒绝，不会覆盖。
pub fn to_wire_task(spec: &JobSpec) -> SolveResult<JsonValue> {
    let kind = spec.kind();
    check_required(spec)?;
    check_reserved(spec)?;

    let mut task = Map::new();
    task.insert("type".into(), kind.wire_type().into());
    if let JobKind::Custom(class) = kind {
        task.insert("class".into(), class.wire_name().into());
    }

    let mut metadata = Map::new();
    for (key, value) in spec.params() {
        let encoded = encode_param(value);
        match key.strip_prefix(METADATA_PREFIX) {
            Some(meta_key) if !meta_key.is_empty() => {
                metadata.insert(meta_key.to_string(), encoded);
            }
            _ => {
                task.insert(key.clone(), encoded);
            }
        }
    }
    if !metadata.is_empty() {
        if task.contains_key("metadata") {
            return Err(SolveError::invalid_spec(
                kind.to_string(),
                "参数 metadata 与 metadata.* 参数冲突",
            ));
        }
        task.insert("metadata".into(), JsonValue::Object(metadata));
    }

    if let Some(proxy) = spec.proxy() {
        if !kind.accepts_proxy() {
            return Err(SolveError::invalid_spec(kind.to_string(), "该任务类型不支持代理"));
        }
        task.insert("proxyType".into(), proxy.proxy_type.as_str().into());
        task.insert("proxyAddress".into(), proxy.address.clone().into());
        task.insert("proxyPort".into(), proxy.port.into());
        if let Some(login) = &proxy.login {
            task.insert("proxyLogin".into(), login.clone().into());
        }
        if let Some(password) = &proxy.password {
            task.insert("proxyPassword".into(), password.clone().into());
        }
    }

    Ok(JsonValue::Object(task))
}

fn check_required(spec: &JobSpec) -> SolveResult<()> {
    let missing: Vec<&str> = spec
        .kind()
        .required_params()
        .iter()
        .copied()
        .filter(|name| !spec.params().contains_key(*name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SolveError::invalid_spec(
            spec.kind().to_string(),
            format!("缺少参数: {}", missing.join(", ")),
        ))
    }
}

/// `type` 总是保留；CustomTask 的 `class` 保留；`proxy*` 只能通过代理描述设置
fn check_reserved(spec: &JobSpec) -> SolveResult<()> {
    let is_custom = matches!(spec.kind(), JobKind::Custom(_));
    let reserved = spec.params().keys().find(|key| {
        key.as_str() == "type"
            || (is_custom && key.as_str() == "class")
            || key.starts_with(PROXY_PREFIX)
    });

    match reserved {
        Some(key) => Err(SolveError::invalid_spec(
            spec.kind().to_string(),
            format!("参数名 {} 是保留字段", key),
        )),
        None => Ok(()),
    }
}

fn encode_param(value: &ParamValue) -> JsonValue {
    match value {
        ParamValue::Text(s) => JsonValue::from(s.clone()),
        ParamValue::Integer(n) => JsonValue::from(*n),
        ParamValue::Float(f) => JsonValue::from(*f),
        ParamValue::Bool(b) => JsonValue::from(*b),
        ParamValue::Binary(bytes) => JsonValue::from(BASE64.encode(bytes)),
        ParamValue::List(items) => JsonValue::Array(items.iter().map(encode_param).collect()),
    }
}
