//! 日志工具模块
//!
//! 提供日志初始化和批量分析过程的输出辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::orchestrator::SweepReport;
use crate::stats::BatchStats;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info 级别。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(api_base_url: &str, image_folder: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量品种识别模式");
    info!("🌐 推理服务: {}", api_base_url);
    info!("📁 图片目录: {}", image_folder);
    info!("{}", "=".repeat(60));
}

/// 记录图片加载信息
pub fn log_images_loaded(total: usize) {
    info!("✓ 找到 {} 张待识别的图片", total);
    info!("📋 将逐张顺序提交，单张失败不影响后续\n");
}

/// 记录批量分析开始
pub fn log_sweep_start(selected: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量分析: 共 {} 张待分析", selected);
    info!("{}", "=".repeat(60));
}

/// 记录批量分析完成
pub fn log_sweep_complete(report: &SweepReport) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 批量分析完成: 成功 {}/{}，失败 {}，跳过 {}",
        report.completed, report.selected, report.failed, report.skipped
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &BatchStats, report_file: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已识别: {}/{}", stats.analyzed, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("🐄 品种数: {}", stats.unique_labels);
    info!("🎯 平均置信度: {:.1}%", stats.average_confidence);
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", report_file);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
