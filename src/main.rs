use std::path::PathBuf;

use anyhow::Result;
use captcha_solve::{utils, App, Command, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = match std::env::var("CAPTCHA_SOLVE_CONFIG") {
        Ok(path) => Config::from_toml_file(&PathBuf::from(path))?,
        Err(_) => Config::from_env(),
    };

    // 初始化日志
    utils::logging::init(&config)?;

    let command = Command::parse(std::env::args().skip(1))?;

    // 初始化并运行应用
    App::initialize(config).await?.run(command).await?;

    Ok(())
}
