//! 响应体解码
//!
//! 远程服务偶尔把 JSON 再编码成字符串返回，这里统一处理：
//! 先按 JSON 解析；若得到的是字符串，再解析一次；两次都失败时
//! 返回原始响应体和状态码，而不是让调用方直接出错。

use serde_json::Value as JsonValue;

use crate::error::{SolveError, SolveResult};
use crate::infrastructure::RawResponse;
use crate::models::ErrorDescriptor;

/// 把原始响应解码成 JSON 对象
pub fn decode_envelope(raw: &RawResponse) -> SolveResult<JsonValue> {
    let decoded = match serde_json::from_str::<JsonValue>(&raw.body) {
        Ok(JsonValue::String(inner)) => serde_json::from_str::<JsonValue>(&inner).ok(),
        Ok(value) => Some(value),
        Err(_) => None,
    };

    match decoded {
        Some(value) if value.is_object() => Ok(value),
        _ => Err(SolveError::MalformedRemoteResponse {
            raw: raw.body.clone(),
            status: raw.status,
        }),
    }
}

/// 提取 `errorId != 0` 的错误描述
pub fn error_descriptor(body: &JsonValue) -> Option<ErrorDescriptor> {
    let error_id = body.get("errorId").and_then(|v| v.as_i64()).unwrap_or(0);
    if error_id == 0 {
        return None;
    }

    let code = body
        .get("errorCode")
        .and_then(|v| v.as_str())
        .unwrap_or("ERROR_UNKNOWN");
    let mut descriptor = ErrorDescriptor::new(error_id, code);
    if let Some(desc) = body.get("errorDescription").and_then(|v| v.as_str()) {
        descriptor = descriptor.with_description(desc);
    }
    Some(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        let raw = RawResponse::new(200, r#"{"errorId":0,"balance":1.25}"#);
        let body = decode_envelope(&raw).unwrap();
        assert_eq!(body["balance"], json!(1.25));
    }

    #[test]
    fn test_nested_string_json() {
        let raw = RawResponse::new(200, r#""{\"errorId\":0,\"balance\":3.5}""#);
        let body = decode_envelope(&raw).unwrap();
        assert_eq!(body["balance"], json!(3.5));
    }

    #[test]
    fn test_not_json_keeps_raw_body_and_status() {
        let raw = RawResponse::new(500, "not-json-at-all");
        match decode_envelope(&raw) {
            Err(SolveError::MalformedRemoteResponse { raw, status }) => {
                assert_eq!(raw, "not-json-at-all");
                assert_eq!(status, 500);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_string_that_is_not_json_is_malformed() {
        let raw = RawResponse::new(200, r#""just a string""#);
        assert!(decode_envelope(&raw).is_err());
    }

    #[test]
    fn test_non_object_is_malformed() {
        let raw = RawResponse::new(200, "42");
        assert!(decode_envelope(&raw).is_err());
    }

    #[test]
    fn test_error_descriptor() {
        let body = json!({
            "errorId": 1,
            "errorCode": "ERROR_KEY_DOES_NOT_EXIST",
            "errorDescription": "Account authorization key not found in the system"
        });
        let desc = error_descriptor(&body).unwrap();
        assert_eq!(desc.error_id, 1);
        assert_eq!(desc.code, "ERROR_KEY_DOES_NOT_EXIST");
        assert!(desc.description.is_some());

        assert!(error_descriptor(&json!({"errorId": 0, "taskId": 7})).is_none());
    }
}
