use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gradecard_calculator::utils::logging;
use gradecard_calculator::{App, Config, GradecardCategory, ProgramCode};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// 查询 IGNOU 成绩单并计算百分比
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// 9 或 10 位学号
    #[arg(short, long)]
    enrollment: String,

    /// 成绩单类别 (1-4)
    #[arg(short, long, default_value = "1")]
    category: GradecardCategory,

    /// 专业代码
    #[arg(short, long, default_value = "MCAOL")]
    program: ProgramCode,

    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 以 JSON 输出成绩汇总
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::initialize(config)?;

    // Ctrl-C 时取消，会话仍会被关闭
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，正在取消...");
            ctrl_c.cancel();
        }
    });

    let result = app
        .run(&cli.enrollment, cli.category, cli.program, &cancel)
        .await;
    app.shutdown();

    let report = result?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    } else {
        logging::log_summary(&report.summary);
    }

    Ok(())
}
