use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 常见的 Chromium 安装位置
pub const CHROMIUM_CANDIDATES: [&str; 4] = [
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/lib/chromium-browser/chromium",
    "/usr/lib/chromium/chromium",
];

/// 查找 Chromium 可执行文件
pub fn find_chromium_binary() -> Option<PathBuf> {
    let found = CHROMIUM_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf);
    match &found {
        Some(path) => info!("找到 Chromium: {}", path.display()),
        None => error!("未找到 Chromium，已检查: {:?}", CHROMIUM_CANDIDATES),
    }
    found
}

/// 启动无头浏览器并打开空白页
///
/// 返回的 `JoinHandle` 是浏览器事件处理任务，关闭浏览器后应当中止它
pub async fn launch_headless_browser(
    executable: Option<&Path>,
) -> Result<(Browser, Page, JoinHandle<()>)> {
    info!("🚀 启动无头浏览器...");

    let executable = match executable {
        Some(path) => path.to_path_buf(),
        None => find_chromium_binary().context("未找到 Chromium，请确认已正确安装")?,
    };
    debug!("浏览器路径: {}", executable.display());

    let config = BrowserConfig::builder()
        .new_headless_mode()
        .chrome_executable(executable)
        .window_size(1920, 1080)
        .args(vec![
            "--no-sandbox",              // 容器内没有沙盒权限
            "--disable-dev-shm-usage",   // 防止共享内存不足
            "--disable-gpu",
            "--remote-debugging-port=0", // 让浏览器自动选择端口
        ])
        .build()
        .map_err(|e| anyhow::anyhow!("配置无头浏览器失败: {}", e))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .context("启动无头浏览器失败")?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            handler_task.abort();
            return Err(anyhow::anyhow!("创建页面失败: {}", e));
        }
    };

    info!("✅ 无头浏览器已就绪");
    Ok((browser, page, handler_task))
}
