//! 会话传输能力 - 基础设施层
//!
//! 只暴露"导航 / 定位 / 填值 / 点击 / 等待 / 读页面"的能力，
//! 不认识学号、专业，也不处理重试。

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DriverFailure;

/// 已定位的页面控件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHandle {
    id: String,
}

impl FieldHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// 一个独占的远程会话
///
/// 每次查询都必须使用独立的实例，用完后调用 [`Transport::close`]
#[async_trait]
pub trait Transport: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverFailure>;

    /// 在限定时间内等待控件出现；`require_interactive` 时还要求可交互
    async fn locate(
        &mut self,
        field_id: &str,
        timeout: Duration,
        require_interactive: bool,
    ) -> Result<FieldHandle, DriverFailure>;

    async fn set_value(&mut self, field: &FieldHandle, value: &str) -> Result<(), DriverFailure>;

    async fn click(&mut self, control: &FieldHandle) -> Result<(), DriverFailure>;

    /// 等待任意一个元素出现，返回先出现的元素 ID
    async fn wait_for_any(
        &mut self,
        element_ids: &[&str],
        timeout: Duration,
    ) -> Result<String, DriverFailure>;

    async fn read_markup(&mut self) -> Result<String, DriverFailure>;

    async fn close(&mut self) -> Result<(), DriverFailure>;
}

/// 会话工厂，每次调用 `open` 返回一个新会话
#[async_trait]
pub trait TransportProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Transport>, DriverFailure>;
}
