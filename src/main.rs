use anyhow::Result;
use lab_result_entry::utils::logging;
use lab_result_entry::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志（终端 + 日志文件）
    let log_file_path = config.output_log_file.clone();
    let log_file = logging::open_log_file(&log_file_path)?;
    logging::init(config.verbose_logging, Some(log_file));

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;
    tracing::info!("日志已保存至: {}", log_file_path);

    if stats.failed > 0 {
        anyhow::bail!("{} 个结果单处理失败", stats.failed);
    }

    Ok(())
}
