//! 成绩单处理流程 - 流程层
//!
//! 流程顺序：
//! 1. 限流 / 占用会话名额 → 提交表单（瞬时错误按策略重试）
//! 2. 页面分类（验证码 / 网站错误 / 成绩表）
//! 3. 解析成绩表 → 计算百分比

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, DriverFailure, PortalError};
use crate::infrastructure::{SessionPool, TransportProvider};
use crate::models::{
    ArtifactReason, ClassifiedResponse, DiagnosticArtifact, GradeSummary, RawResultPage,
    SubmissionRequest,
};
use crate::services::{classify, extract, score, ColumnWarning, SessionDriver};
use crate::utils::logging::truncate_text;
use crate::workflow::retry::{RetryDecision, RetryPolicy};

/// 一次成功查询的结果
#[derive(Debug, Clone)]
pub struct GradeReport {
    pub request: SubmissionRequest,
    pub summary: GradeSummary,
    /// 缺失列等非致命问题
    pub warnings: Vec<ColumnWarning>,
    /// 实际尝试次数
    pub attempts: usize,
}

/// 查询失败
///
/// 页面相关的失败会附带原始页面，由调用方决定是否保存
#[derive(Debug, Error)]
#[error("{error}")]
pub struct FlowFailure {
    #[source]
    pub error: AppError,
    pub artifact: Option<DiagnosticArtifact>,
    pub attempts: usize,
}

impl FlowFailure {
    pub fn new(error: impl Into<AppError>, attempts: usize) -> Self {
        Self {
            error: error.into(),
            artifact: None,
            attempts,
        }
    }

    fn with_page(mut self, reason: ArtifactReason, page: RawResultPage) -> Self {
        self.artifact = Some(DiagnosticArtifact::new(reason, page));
        self
    }
}

/// 成绩单处理流程
///
/// - 不持有会话，每次尝试向 provider 申请新会话
/// - 重试只针对会话阶段的瞬时错误
pub struct GradeFlow {
    driver: SessionDriver,
    policy: RetryPolicy,
    result_wait: Duration,
}

impl GradeFlow {
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            SessionDriver::new(config),
            RetryPolicy::from_config(config),
            config.result_wait(),
        )
    }

    pub fn with_parts(driver: SessionDriver, policy: RetryPolicy, result_wait: Duration) -> Self {
        Self {
            driver,
            policy,
            result_wait,
        }
    }

    pub async fn run(
        &self,
        provider: &dyn TransportProvider,
        pool: &SessionPool,
        request: &SubmissionRequest,
        cancel: &CancellationToken,
    ) -> Result<GradeReport, FlowFailure> {
        let (page, attempts) = self.fetch_page(provider, pool, request, cancel).await?;
        info!("{} ✓ 已获取页面 (第 {} 次尝试)", request, attempts);

        let table = match classify(&page) {
            ClassifiedResponse::ResultTable(table) => table,
            ClassifiedResponse::CaptchaChallenge => {
                error!("{} ❌ 检测到验证码", request);
                return Err(FlowFailure::new(PortalError::CaptchaChallenge, attempts)
                    .with_page(ArtifactReason::Captcha, page));
            }
            ClassifiedResponse::ServerError(message) => {
                error!("{} ❌ 网站返回错误: {}", request, truncate_text(&message, 120));
                return Err(FlowFailure::new(PortalError::ServerMessage { message }, attempts)
                    .with_page(ArtifactReason::ServerError, page));
            }
            ClassifiedResponse::TableNotFound => {
                error!(
                    "{} ❌ 未找到成绩表 (专业: {})",
                    request, request.program
                );
                return Err(FlowFailure::new(PortalError::TableNotFound, attempts)
                    .with_page(ArtifactReason::TableNotFound, page));
            }
        };

        let extraction = match extract(&table) {
            Ok(extraction) => extraction,
            Err(e) => {
                error!("{} ❌ 成绩表解析失败: {}", request, e);
                return Err(FlowFailure::new(e, attempts).with_page(ArtifactReason::Extraction, page));
            }
        };
        for warning in &extraction.warnings {
            warn!("{} ⚠️ {}", request, warning);
        }

        let summary = score(&extraction.records);
        info!(
            "{} ✓ 计入 {} 门课程，百分比 {}%",
            request, summary.subject_count, summary.final_percentage
        );

        Ok(GradeReport {
            request: request.clone(),
            summary,
            warnings: extraction.warnings,
            attempts,
        })
    }

    /// 提交表单并在瞬时错误时重试
    async fn fetch_page(
        &self,
        provider: &dyn TransportProvider,
        pool: &SessionPool,
        request: &SubmissionRequest,
        cancel: &CancellationToken,
    ) -> Result<(RawResultPage, usize), FlowFailure> {
        let mut state = self.policy.start();

        loop {
            info!(
                "{} 🔍 开始第 {}/{} 次尝试",
                request,
                state.next_attempt(),
                self.policy.max_attempts()
            );

            // 限流等待期间也要响应取消
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(FlowFailure::new(DriverFailure::Cancelled, state.attempts()));
                }
                acquired = pool.acquire() => {
                    acquired.map_err(|e| FlowFailure::new(e, state.attempts()))?
                }
            };
            let outcome = self
                .driver
                .submit(provider, request, self.result_wait, cancel)
                .await;
            drop(permit);

            let decision = state.record(&outcome);
            match (outcome, decision) {
                (Ok(page), _) => return Ok((page, state.attempts())),
                (Err(e), RetryDecision::Retry { delay }) => {
                    warn!(
                        "{} ⚠️ 第 {} 次尝试失败: {}，{} 秒后重试...",
                        request,
                        state.attempts(),
                        e.failure,
                        delay.as_secs()
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            return Err(FlowFailure::new(DriverFailure::Cancelled, state.attempts()));
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                (Err(e), _) => {
                    error!(
                        "{} ❌ 已尝试 {} 次，放弃: {}",
                        request,
                        state.attempts(),
                        e.failure
                    );
                    let failure = FlowFailure::new(e.failure, state.attempts());
                    return Err(match e.page {
                        Some(page) => failure.with_page(ArtifactReason::RetriesExhausted, page),
                        None => failure,
                    });
                }
            }
        }
    }
}
