//! 日志工具模块
//!
//! 提供日志初始化和成绩汇总输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{CourseRecord, GradeSummary};

/// 初始化 tracing，`RUST_LOG` 优先
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🎓 成绩单百分比计算 - 启动");
    info!("🌐 目标页面: {}", config.target_url);
    info!(
        "📊 会话上限: {} | 限流: {} 次 / {} 秒",
        config.max_concurrent_sessions, config.rate_limit_max, config.rate_limit_window_secs
    );
    info!(
        "🔁 最多重试 {} 次，间隔 {} 秒",
        config.max_retries, config.retry_delay_secs
    );
    info!("{}", "=".repeat(60));
}

/// 输出成绩汇总
pub fn log_summary(summary: &GradeSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 成绩汇总");
    info!("{}", "=".repeat(60));
    info!("最终百分比: {}%", summary.final_percentage);
    info!(
        "实得总分: {:.2} / {:.0}",
        summary.total_obtained_marks, summary.total_possible_marks
    );
    info!("作业总分: {:.0}", summary.totals.assignment_mark);
    info!("理论总分: {:.0}", summary.totals.theory_mark);
    info!("实践总分: {:.0}", summary.totals.practical_mark);

    info!("\n✅ 已完成课程");
    info!(
        "{:>3}  {:<14} {:>6} {:>6} {:>6} {:>8} {:>8} {:>8}",
        "#", "课程", "作业", "理论", "实践", "30%作业", "70%考试", "合计"
    );
    for (i, scored) in summary.scored_records.iter().enumerate() {
        let r = &scored.record;
        info!(
            "{:>3}  {:<14} {:>6.0} {:>6.0} {:>6.0} {:>8.2} {:>8.2} {:>8.2}",
            i + 1,
            r.course,
            r.assignment_mark,
            r.theory_mark,
            r.practical_mark,
            scored.assignment_weighted,
            scored.theory_or_practical_weighted,
            scored.total
        );
    }
    let t = &summary.totals;
    info!(
        "{:>3}  {:<14} {:>6.0} {:>6.0} {:>6.0} {:>8.2} {:>8.2} {:>8.2}",
        summary.scored_records.len() + 1,
        t.label,
        t.assignment_mark,
        t.theory_mark,
        t.practical_mark,
        t.assignment_weighted,
        t.theory_or_practical_weighted,
        t.total
    );

    if !summary.incomplete.is_empty() {
        log_incomplete(&summary.incomplete);
    }
    info!("{}", "=".repeat(60));
}

fn log_incomplete(records: &[CourseRecord]) {
    info!("\n⚠️ 未完成课程");
    for r in records {
        info!(
            "     {:<14} {:<16} 作业 {:.0} | 理论 {:.0} | 实践 {:.0}",
            r.course, r.status, r.assignment_mark, r.theory_mark, r.practical_mark
        );
    }
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
