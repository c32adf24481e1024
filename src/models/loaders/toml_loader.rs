use crate::models::job_spec::{JobKind, JobSpec, ParamValue, ProxyDescriptor};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tokio::fs;

/// 任务批次文件
#[derive(Debug, Deserialize)]
struct JobBatchFile {
    #[serde(default)]
    jobs: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    id: Option<String>,
    kind: String,
    #[serde(default)]
    params: toml::Table,
    proxy: Option<ProxyDescriptor>,
}

/// 从 TOML 文件加载任务列表
///
/// 参数值写成 `{ file = "captcha.png" }` 时读取该文件作为二进制参数，
/// 相对路径以批次文件所在目录为基准。
pub async fn load_job_batch(path: &Path) -> Result<Vec<JobSpec>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取任务文件: {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let jobs = parse_job_batch(&content, base_dir)
        .await
        .with_context(|| format!("无法解析任务文件: {}", path.display()))?;

    tracing::info!(
        "成功加载 {} 个任务: {}",
        jobs.len(),
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(jobs)
}

/// 解析任务批次内容
///
/// `{ file = "..." }` 参数在这里异步读取。
pub async fn parse_job_batch(content: &str, base_dir: &Path) -> Result<Vec<JobSpec>> {
    let batch: JobBatchFile = toml::from_str(content).context("TOML 格式错误")?;

    let mut jobs = Vec::with_capacity(batch.jobs.len());
    for (idx, raw) in batch.jobs.into_iter().enumerate() {
        jobs.push(build_job(idx, raw, base_dir).await?);
    }
    Ok(jobs)
}

async fn build_job(idx: usize, raw: RawJob, base_dir: &Path) -> Result<JobSpec> {
    let kind = JobKind::from_name(&raw.kind)
        .with_context(|| format!("第 {} 个任务的类型未知: {}", idx + 1, raw.kind))?;
    let id = raw.id.unwrap_or_else(|| format!("job-{}", idx + 1));

    let mut spec = JobSpec::new(id, kind);
    for (key, value) in raw.params {
        let param = convert_value(&value, base_dir)
            .await
            .with_context(|| format!("第 {} 个任务的参数 {} 无效", idx + 1, key))?;
        spec = spec.param(key, param);
    }
    if let Some(proxy) = raw.proxy {
        spec = spec.with_proxy(proxy);
    }

    Ok(spec)
}

// 数组可以嵌套，递归的 async 调用需要装箱
fn convert_value<'a>(
    value: &'a toml::Value,
    base_dir: &'a Path,
) -> Pin<Box<dyn Future<Output = Result<ParamValue>> + Send + 'a>> {
    Box::pin(async move {
        let param = match value {
            toml::Value::String(s) => ParamValue::Text(s.clone()),
            toml::Value::Integer(n) => ParamValue::Integer(*n),
            toml::Value::Float(f) => ParamValue::Float(*f),
            toml::Value::Boolean(b) => ParamValue::Bool(*b),
            toml::Value::Datetime(dt) => ParamValue::Text(dt.to_string()),
            toml::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    list.push(convert_value(item, base_dir).await?);
                }
                ParamValue::List(list)
            }
            toml::Value::Table(table) => {
                let file = table
                    .get("file")
                    .and_then(|v| v.as_str())
                    .context("表类型的参数只支持 { file = \"...\" }")?;
                let file_path = base_dir.join(file);
                let bytes = fs::read(&file_path)
                    .await
                    .with_context(|| format!("无法读取文件: {}", file_path.display()))?;
                ParamValue::Binary(bytes)
            }
        };
        Ok(param)
    })
}
