//! chromiumoxide 浏览器会话 - 基础设施层

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser;
use crate::error::DriverFailure;
use crate::infrastructure::js_executor::{element_script, JsExecutor};
use crate::infrastructure::transport::{FieldHandle, Transport, TransportProvider};

/// 浏览器来源
#[derive(Debug, Clone)]
pub enum BrowserMode {
    /// 每次启动新的无头浏览器
    Headless { executable: Option<PathBuf> },
    /// 连接已运行的浏览器，每次新建独立页面
    Connect { port: u16 },
}

/// 浏览器会话工厂
pub struct BrowserProvider {
    mode: BrowserMode,
}

impl BrowserProvider {
    pub fn new(mode: BrowserMode) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl TransportProvider for BrowserProvider {
    async fn open(&self) -> Result<Box<dyn Transport>, DriverFailure> {
        let (launched, result) = match &self.mode {
            BrowserMode::Headless { executable } => (
                true,
                browser::launch_headless_browser(executable.as_deref()).await,
            ),
            BrowserMode::Connect { port } => {
                (false, browser::connect_to_browser_and_page(*port).await)
            }
        };
        let (browser, page, handler_task) =
            result.map_err(|e| DriverFailure::init_failed(format!("{:#}", e)))?;

        Ok(Box::new(BrowserTransport {
            browser,
            executor: JsExecutor::new(page),
            handler_task,
            launched,
            closed: false,
        }))
    }
}

/// 单个浏览器会话
pub struct BrowserTransport {
    browser: Browser,
    executor: JsExecutor,
    handler_task: JoinHandle<()>,
    /// 浏览器由本会话启动，关闭时整个退出；否则只关闭自己的页面
    launched: bool,
    closed: bool,
}

/// 控件状态："missing" / "disabled" / "hidden" / "ready"
const ELEMENT_STATE_BODY: &str = r#"
    if (el.disabled) return "disabled";
    const style = window.getComputedStyle(el);
    if (style.display === "none" || style.visibility === "hidden") return "hidden";
    return "ready";
"#;

const SET_VALUE_BODY: &str = r#"
    if (el.tagName === "SELECT" && !Array.from(el.options).some(o => o.value === value)) {
        return "no-option";
    }
    el.value = value;
    el.dispatchEvent(new Event("input", { bubbles: true }));
    el.dispatchEvent(new Event("change", { bubbles: true }));
    return "ok";
"#;

// 用脚本点击，避免被遮挡层拦截
const CLICK_BODY: &str = r#"
    el.click();
    return "ok";
"#;

#[async_trait]
impl Transport for BrowserTransport {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverFailure> {
        self.executor.page().goto(url).await?;
        debug!("已导航到: {}", url);
        Ok(())
    }

    async fn locate(
        &mut self,
        field_id: &str,
        timeout: Duration,
        require_interactive: bool,
    ) -> Result<FieldHandle, DriverFailure> {
        let js_code = element_script(field_id, ELEMENT_STATE_BODY)?;
        let accept = |state: &str| match state {
            "ready" => true,
            "disabled" | "hidden" => !require_interactive,
            _ => false,
        };
        match self.executor.poll_until(&js_code, timeout, accept).await {
            Ok(_) => Ok(FieldHandle::new(field_id)),
            Err(state) => {
                debug!("控件 {} 状态: {}", field_id, state);
                Err(DriverFailure::element_unavailable(field_id))
            }
        }
    }

    async fn set_value(&mut self, field: &FieldHandle, value: &str) -> Result<(), DriverFailure> {
        let body = format!("const value = {};{}", serde_json::to_string(value)?, SET_VALUE_BODY);
        let js_code = element_script(field.id(), &body)?;
        match self.executor.eval_as::<String>(js_code).await?.as_str() {
            "ok" => Ok(()),
            state => {
                debug!("设置 {} 失败: {}", field.id(), state);
                Err(DriverFailure::element_unavailable(field.id()))
            }
        }
    }

    async fn click(&mut self, control: &FieldHandle) -> Result<(), DriverFailure> {
        let js_code = element_script(control.id(), CLICK_BODY)?;
        match self.executor.eval_as::<String>(js_code).await?.as_str() {
            "ok" => Ok(()),
            _ => Err(DriverFailure::element_unavailable(control.id())),
        }
    }

    async fn wait_for_any(
        &mut self,
        element_ids: &[&str],
        timeout: Duration,
    ) -> Result<String, DriverFailure> {
        let js_code = format!(
            r#"
            (() => {{
                const ids = {};
                return ids.find(id => document.getElementById(id) !== null) || "";
            }})()
            "#,
            serde_json::to_string(element_ids)?
        );
        // 提交后页面跳转期间脚本会失败，继续等待
        self.executor
            .poll_until(&js_code, timeout, |found| !found.is_empty())
            .await
            .map_err(|_| DriverFailure::timeout(timeout))
    }

    async fn read_markup(&mut self) -> Result<String, DriverFailure> {
        Ok(self.executor.page().content().await?)
    }

    async fn close(&mut self) -> Result<(), DriverFailure> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = if self.launched {
            let closed = self.browser.close().await.map(|_| ());
            if let Err(e) = self.browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
            closed
        } else {
            self.executor.page().clone().close().await
        };
        self.handler_task.abort();
        result.map_err(DriverFailure::from)
    }
}

impl Drop for BrowserTransport {
    fn drop(&mut self) {
        if !self.closed {
            warn!("浏览器会话未关闭就被释放");
            self.handler_task.abort();
        }
    }
}
