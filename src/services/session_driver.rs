//! 远程会话驱动 - 业务能力层
//!
//! 完成一次"打开页面 → 填写表单 → 提交 → 等待结果"的尝试。
//! 不做重试，重试由流程层决定。会话在任何退出路径上都会被关闭。

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::DriverFailure;
use crate::infrastructure::{Transport, TransportProvider};
use crate::models::{RawResultPage, SubmissionRequest};
use crate::services::classifier::{MESSAGE_ID, RESULT_TABLE_ID};

/// 成绩单页面的控件 ID
pub mod fields {
    pub const CATEGORY: &str = "ddlGradecardfor";
    pub const PROGRAM: &str = "ddlProgram";
    pub const ENROLLMENT: &str = "txtEnrno";
    pub const SUBMIT: &str = "btnlogin";
}

/// 一次尝试的失败
///
/// 超时或控件不可用时附带当时的页面，便于排查
#[derive(Debug)]
pub struct AttemptFailure {
    pub failure: DriverFailure,
    pub page: Option<RawResultPage>,
}

impl From<DriverFailure> for AttemptFailure {
    fn from(failure: DriverFailure) -> Self {
        Self {
            failure,
            page: None,
        }
    }
}

impl AsRef<DriverFailure> for AttemptFailure {
    fn as_ref(&self) -> &DriverFailure {
        &self.failure
    }
}

pub struct SessionDriver {
    target_url: String,
    element_wait: Duration,
}

impl SessionDriver {
    pub fn new(config: &Config) -> Self {
        Self::with_settings(config.target_url.clone(), config.element_wait())
    }

    pub fn with_settings(target_url: impl Into<String>, element_wait: Duration) -> Self {
        Self {
            target_url: target_url.into(),
            element_wait,
        }
    }

    /// 执行一次提交
    ///
    /// `result_wait` 是提交后等待结果或错误提示的时限，只作用于本次尝试
    pub async fn submit(
        &self,
        provider: &dyn TransportProvider,
        request: &SubmissionRequest,
        result_wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<RawResultPage, AttemptFailure> {
        let mut transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DriverFailure::Cancelled.into()),
            opened = bounded(self.element_wait, provider.open()) => opened?,
        };
        debug!("{} 会话已打开", request);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DriverFailure::Cancelled),
            result = self.drive(transport.as_mut(), request, result_wait) => result,
        };

        let outcome = match outcome {
            Ok(page) => Ok(page),
            Err(failure) => {
                let page = match failure {
                    DriverFailure::Timeout { .. } | DriverFailure::ElementUnavailable { .. } => {
                        self.snapshot(transport.as_mut(), request).await
                    }
                    _ => None,
                };
                Err(AttemptFailure { failure, page })
            }
        };

        // 无论成功与否都要释放会话
        match bounded(self.element_wait, transport.close()).await {
            Ok(()) => debug!("{} 会话已关闭", request),
            Err(e) => warn!("{} 关闭会话失败: {}", request, e),
        }

        outcome
    }

    /// 尽力读取当前页面，读不到就算了
    async fn snapshot(
        &self,
        transport: &mut dyn Transport,
        request: &SubmissionRequest,
    ) -> Option<RawResultPage> {
        match bounded(self.element_wait, transport.read_markup()).await {
            Ok(markup) if !markup.trim().is_empty() => Some(RawResultPage::new(markup)),
            Ok(_) => None,
            Err(e) => {
                debug!("{} 读取失败时的页面出错: {}", request, e);
                None
            }
        }
    }

    async fn drive(
        &self,
        transport: &mut dyn Transport,
        request: &SubmissionRequest,
        result_wait: Duration,
    ) -> Result<RawResultPage, DriverFailure> {
        let wait = self.element_wait;
        // 控件查找自带时限，这里的外层时限只防止会话本身卡死
        let locate_bound = wait * 2;

        bounded(wait, transport.navigate(&self.target_url)).await?;
        info!("{} 已打开成绩单页面", request);

        let selections = [
            (fields::CATEGORY, request.category.value()),
            (fields::PROGRAM, request.program.code()),
            (fields::ENROLLMENT, request.enrollment.as_str()),
        ];
        for (field_id, value) in selections {
            let field = bounded(locate_bound, transport.locate(field_id, wait, true)).await?;
            bounded(wait, transport.set_value(&field, value)).await?;
            debug!("{} 已填写 {}", request, field_id);
        }

        let submit = bounded(locate_bound, transport.locate(fields::SUBMIT, wait, true)).await?;
        bounded(wait, transport.click(&submit)).await?;
        info!("{} 已提交表单", request);

        let matched = bounded(
            result_wait + wait,
            transport.wait_for_any(&[RESULT_TABLE_ID, MESSAGE_ID], result_wait),
        )
        .await?;
        debug!("{} 页面出现: {}", request, matched);

        let markup = bounded(wait, transport.read_markup()).await?;
        Ok(RawResultPage::new(markup))
    }
}

/// 给单步操作加上时限，防止会话卡死
async fn bounded<T>(
    limit: Duration,
    step: impl Future<Output = Result<T, DriverFailure>>,
) -> Result<T, DriverFailure> {
    tokio::time::timeout(limit, step)
        .await
        .map_err(|_| DriverFailure::timeout(limit))?
}
