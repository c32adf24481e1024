//! 用户凭证（CapMonster API key）

use std::fmt;
use std::sync::Arc;

/// 用户的 API key
///
/// 只在构建请求体时通过 [`Credential::expose`] 取出明文，
/// `Debug` 输出永远是 `[REDACTED]`，也不实现 `Display`。
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    /// 从原始输入创建凭证，去掉首尾空白
    pub fn new(raw: &str) -> Self {
        Self(Arc::from(raw.trim()))
    }

    /// 取出明文，只用于请求体
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}
