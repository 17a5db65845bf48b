//! 页面脚本执行 - 基础设施层
//!
//! 持有会话的 page，负责执行脚本和轮询页面状态

use std::time::Duration;

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use tokio::time::{sleep, Instant};

use crate::error::DriverFailure;

/// 轮询页面状态的间隔
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 生成针对单个控件的脚本，控件不存在时返回 "missing"
///
/// `body` 中可以用 `el` 引用控件，必须返回字符串
pub fn element_script(field_id: &str, body: &str) -> Result<String, DriverFailure> {
    Ok(format!(
        r#"
        (() => {{
            const el = document.getElementById({});
            if (!el) return "missing";
            {}
        }})()
        "#,
        serde_json::to_string(field_id)?,
        body
    ))
}

pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行脚本并反序列化结果
    ///
    /// 脚本不要返回 `null`，chromiumoxide 会把它当作没有返回值
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, DriverFailure> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(serde_json::from_value(result.into_value()?)?)
    }

    /// 反复执行返回字符串的脚本，直到 `accept` 接受结果或超时
    ///
    /// 页面回发或跳转期间脚本可能失败，这类失败按空串处理继续等待。
    /// 超时返回最后一次看到的结果。
    pub async fn poll_until(
        &self,
        js_code: &str,
        timeout: Duration,
        accept: impl Fn(&str) -> bool,
    ) -> Result<String, String> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self
                .eval_as::<String>(js_code)
                .await
                .unwrap_or_default();
            if accept(&state) {
                return Ok(state);
            }
            if Instant::now() >= deadline {
                return Err(state);
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
