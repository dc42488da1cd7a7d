//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use crate::config::Config;
use crate::workflow::SubmissionStatus;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 RUST_LOG；否则默认 info，详细模式为 debug。重复调用无副作用
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 课堂反馈问卷");
    info!("📮 收集端: {}", truncate_text(&config.collector_url, 60));
    info!("💾 本地快照: {}", config.storage_path);
    info!("{}", "=".repeat(60));
}

/// 记录提交结果
pub fn log_submission_result(status: &SubmissionStatus) {
    info!("\n{}", "─".repeat(60));
    match status {
        SubmissionStatus::Succeeded(receipt) => {
            info!("✅ 提交成功: {} 个文件", receipt.file_count);
            for (i, url) in receipt.file_urls.iter().enumerate() {
                info!("   {}. {}", i + 1, url);
            }
        }
        SubmissionStatus::Failed(message) => {
            error!("❌ 提交失败: {}", message);
        }
        SubmissionStatus::NotSubmitted => {
            warn!("⚠️ 尚未提交");
        }
    }
    info!(
        "时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("课堂反馈问卷", 2), "课堂...");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}
