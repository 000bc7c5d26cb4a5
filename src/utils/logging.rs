use anyhow::{Context, Result};
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, File, OpenOptions};
use std::ops::RangeInclusive;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`。
/// 传入 `log_file` 时，同样的日志（无颜色）也追加写入该文件。
/// 重复调用是安全的（测试中会多次调用）。
pub fn init(verbose: bool, log_file: Option<File>) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();
}

/// 创建日志文件：写入表头后以追加模式打开，交给 [`init`] 使用
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn open_log_file(log_file_path: &str) -> Result<File> {
    let log_header = format!(
        "{}\n检验结果录入日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法创建日志文件: {}", log_file_path))?;

    OpenOptions::new()
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `api_base_url`: 检验 API 地址
pub fn log_startup(max_concurrent: usize, api_base_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量结果录入模式");
    info!("🔗 检验 API: {}", api_base_url);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录结果单加载信息
pub fn log_sheets_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的结果单", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch`: 批次编号与批次总数
/// - `sheets`: 本批结果单编号范围（从 1 开始）
/// - `total`: 结果单总数
pub fn log_batch_start(batch: (usize, usize), sheets: RangeInclusive<usize>, total: usize) {
    info!(
        "📦 第 {}/{} 批: 结果单 {}-{} / 共 {} 个",
        batch.0,
        batch.1,
        sheets.start(),
        sheets.end(),
        total
    );
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    if success == total {
        info!("✓ 第 {} 批完成: {} 个全部成功", batch_num, total);
    } else {
        info!(
            "⚠️ 第 {} 批完成: 成功 {}/{}，失败 {}",
            batch_num,
            success,
            total,
            total - success
        );
    }
}

/// 打印最终统计信息
pub fn print_final_stats(success: usize, failed: usize, total: usize) {
    info!("{}", "=".repeat(60));
    info!(
        "📊 处理完成 ({}): 成功 {}/{}, 失败 {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        success,
        total,
        failed
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("血红蛋白测定", 4), "血红蛋白...");
        assert_eq!(truncate_text("Urea", 10), "Urea");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false, None);
        init(true, None);
    }

    #[test]
    fn test_open_log_file_writes_header_and_appends() {
        use std::io::Write;

        let path = std::env::temp_dir().join(format!("lab_log_{}.txt", std::process::id()));
        let path_str = path.to_string_lossy().to_string();

        let mut file = open_log_file(&path_str).unwrap();
        writeln!(file, "INFO 第一行").unwrap();
        drop(file);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("检验结果录入日志"));
        assert!(content.ends_with("INFO 第一行\n"));

        std::fs::remove_file(&path).unwrap();
    }
}
