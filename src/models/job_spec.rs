//! 任务描述：任务类型 + 参数表 + 可选代理

use std::collections::BTreeMap;
use std::fmt;

use phf::phf_map;
use serde::Deserialize;

/// CustomTask 的子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomClass {
    DataDome,
    TenDi,
    Basilisk,
    Imperva,
    Temu,
    Altcha,
}

impl CustomClass {
    /// 远程服务使用的 class 名称
    pub fn wire_name(self) -> &'static str {
        match self {
            CustomClass::DataDome => "DataDome",
            CustomClass::TenDi => "TenDI",
            CustomClass::Basilisk => "Basilisk",
            CustomClass::Imperva => "Imperva",
            CustomClass::Temu => "Temu",
            CustomClass::Altcha => "altcha",
        }
    }
}

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// 图片文字识别
    ImageToText,
    RecaptchaV2,
    RecaptchaV3Proxyless,
    RecaptchaV2Enterprise,
    GeeTest,
    /// Cloudflare Turnstile
    Turnstile,
    /// 复杂图片（点选 / 旋转等）
    ComplexImage,
    Amazon,
    Binance,
    Prosopo,
    Yidun,
    MtCaptcha,
    /// 通过 `CustomTask` + class 提交的站点验证
    Custom(CustomClass),
}

static KIND_BY_NAME: phf::Map<&'static str, JobKind> = phf_map! {
    "ImageToTextTask" => JobKind::ImageToText,
    "RecaptchaV2Task" => JobKind::RecaptchaV2,
    "RecaptchaV3TaskProxyless" => JobKind::RecaptchaV3Proxyless,
    "RecaptchaV2EnterpriseTask" => JobKind::RecaptchaV2Enterprise,
    "GeeTestTask" => JobKind::GeeTest,
    "TurnstileTask" => JobKind::Turnstile,
    "TurnstileTaskProxyless" => JobKind::Turnstile,
    "ComplexImageTask" => JobKind::ComplexImage,
    "AmazonTask" => JobKind::Amazon,
    "BinanceTask" => JobKind::Binance,
    "ProsopoTask" => JobKind::Prosopo,
    "YidunTask" => JobKind::Yidun,
    "MTCaptchaTask" => JobKind::MtCaptcha,
    "DataDome" => JobKind::Custom(CustomClass::DataDome),
    "TenDI" => JobKind::Custom(CustomClass::TenDi),
    "Basilisk" => JobKind::Custom(CustomClass::Basilisk),
    "Imperva" => JobKind::Custom(CustomClass::Imperva),
    "Temu" => JobKind::Custom(CustomClass::Temu),
    "altcha" => JobKind::Custom(CustomClass::Altcha),
};

impl JobKind {
    /// 按名称解析任务类型（区分大小写，接受任务名或 CustomTask 的 class 名）
    pub fn from_name(name: &str) -> Option<Self> {
        KIND_BY_NAME.get(name.trim()).copied()
    }

    /// 远程服务的 `type` 字段
    pub fn wire_type(self) -> &'static str {
        match self {
            JobKind::ImageToText => "ImageToTextTask",
            JobKind::RecaptchaV2 => "RecaptchaV2Task",
            JobKind::RecaptchaV3Proxyless => "RecaptchaV3TaskProxyless",
            JobKind::RecaptchaV2Enterprise => "RecaptchaV2EnterpriseTask",
            JobKind::GeeTest => "GeeTestTask",
            JobKind::Turnstile => "TurnstileTask",
            JobKind::ComplexImage => "ComplexImageTask",
            JobKind::Amazon => "AmazonTask",
            JobKind::Binance => "BinanceTask",
            JobKind::Prosopo => "ProsopoTask",
            JobKind::Yidun => "YidunTask",
            JobKind::MtCaptcha => "MTCaptchaTask",
            JobKind::Custom(_) => "CustomTask",
        }
    }

    /// 提交前必须存在的参数
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            JobKind::ImageToText => &["body"],
            JobKind::GeeTest => &["websiteURL", "gt"],
            JobKind::ComplexImage => &["class"],
            JobKind::Binance => &["websiteURL", "websiteKey", "validateId"],
            JobKind::Custom(_) => &["websiteURL"],
            JobKind::RecaptchaV2
            | JobKind::RecaptchaV3Proxyless
            | JobKind::RecaptchaV2Enterprise
            | JobKind::Turnstile
            | JobKind::Amazon
            | JobKind::Prosopo
            | JobKind::Yidun
            | JobKind::MtCaptcha => &["websiteURL", "websiteKey"],
        }
    }

    /// 是否允许携带代理
    pub fn accepts_proxy(self) -> bool {
        !matches!(
            self,
            JobKind::ImageToText | JobKind::ComplexImage | JobKind::RecaptchaV3Proxyless
        )
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Custom(class) => write!(f, "CustomTask/{}", class.wire_name()),
            other => f.write_str(other.wire_type()),
        }
    }
}

/// 参数值
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// 二进制数据（图片等），提交时转为 base64
    Binary(Vec<u8>),
    List(Vec<ParamValue>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(value: Vec<u8>) -> Self {
        ParamValue::Binary(value)
    }
}

/// 代理协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        }
    }
}

/// 代理描述
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyDescriptor {
    #[serde(rename = "type")]
    pub proxy_type: ProxyType,
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyDescriptor")
            .field("proxy_type", &self.proxy_type)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// 一个待求解的任务
///
/// 构造完成后不可修改；`id` 是它在批量结果中的身份。
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    id: String,
    kind: JobKind,
    params: BTreeMap<String, ParamValue>,
    proxy: Option<ProxyDescriptor>,
}

impl JobSpec {
    pub fn new(id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: id.into(),
            kind,
            params: BTreeMap::new(),
            proxy: None,
        }
    }

    /// 添加一个参数（`metadata.` 前缀的键会被放进 metadata 对象）
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyDescriptor) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn proxy(&self) -> Option<&ProxyDescriptor> {
        self.proxy.as_ref()
    }
}
