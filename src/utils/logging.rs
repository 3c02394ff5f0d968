/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{Problem, ProviderKind};

/// 初始化日志
///
/// 级别由 `RUST_LOG` 控制，默认 `info`；重复调用不会报错
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 记录抓取开始信息
pub fn log_scrape_start(provider: ProviderKind, with_login: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始抓取每日一题 - {}", provider.display_name());
    info!("🔐 登录: {}", if with_login { "是" } else { "否" });
    info!("{}", "=".repeat(60));
}

/// 记录抓取结果摘要
///
/// # 参数
/// - `problem`: 抓取到的题目
pub fn log_problem_summary(problem: &Problem) {
    info!("\n{}", "─".repeat(60));
    info!("✅ {} [{}]", problem.title, problem.difficulty);
    info!("🔗 {}", problem.url);
    info!(
        "📄 示例 {} 个, 约束 {} 条, 标签 {} 个",
        problem.examples.as_ref().map_or(0, Vec::len),
        problem.constraints.as_ref().map_or(0, Vec::len),
        problem.topics.len()
    );
    if let Some(description) = &problem.description {
        info!("📝 {}", truncate_text(description, 80));
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
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
