//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、创建会话池和会话工厂
//! 2. **资源管理**：持有 `SessionPool` 和 `TransportProvider`，生命周期与进程一致
//! 3. **单次查询**：校验输入 → 委托 `GradeFlow` → 失败时保存诊断页面

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{Config, TransportKind};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{BrowserMode, BrowserProvider, HttpProvider, SessionPool, TransportProvider};
use crate::models::{GradecardCategory, ProgramCode, SubmissionRequest};
use crate::services::ArtifactWriter;
use crate::utils::logging;
use crate::workflow::{FlowFailure, GradeFlow, GradeReport};

/// 应用主结构
pub struct App {
    config: Config,
    pool: SessionPool,
    provider: Box<dyn TransportProvider>,
    flow: GradeFlow,
    artifacts: ArtifactWriter,
}

impl App {
    /// 按配置选择会话方式并初始化
    pub fn initialize(config: Config) -> AppResult<Self> {
        let provider: Box<dyn TransportProvider> = match config.transport {
            TransportKind::Http => Box::new(HttpProvider::new(config.element_wait())),
            TransportKind::Browser if config.browser_debug_port != 0 => {
                Box::new(BrowserProvider::new(BrowserMode::Connect {
                    port: config.browser_debug_port,
                }))
            }
            TransportKind::Browser => Box::new(BrowserProvider::new(BrowserMode::Headless {
                executable: config.chrome_executable.as_ref().map(PathBuf::from),
            })),
        };
        Self::with_provider(config, provider)
    }

    /// 使用指定的会话工厂初始化
    pub fn with_provider(config: Config, provider: Box<dyn TransportProvider>) -> AppResult<Self> {
        config.validate().map_err(AppError::from)?;
        logging::log_startup(&config);

        Ok(Self {
            pool: SessionPool::from_config(&config),
            flow: GradeFlow::new(&config),
            artifacts: ArtifactWriter::new(&config.artifact_dir),
            provider,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 查询一次成绩单
    pub async fn run(
        &self,
        enrollment: &str,
        category: GradecardCategory,
        program: ProgramCode,
        cancel: &CancellationToken,
    ) -> Result<GradeReport, FlowFailure> {
        let request = SubmissionRequest::new(enrollment, category, program).map_err(|e| {
            error!("❌ {}", e);
            FlowFailure::new(e, 0)
        })?;
        info!("{} 开始查询 (类别: {}, 专业: {})", request, request.category, request.program);

        let result = self
            .flow
            .run(self.provider.as_ref(), &self.pool, &request, cancel)
            .await;

        if let Err(failure) = &result {
            self.save_artifact(failure).await;
            error!("{} {}", request, failure.error.category().user_message());
        }
        result
    }

    async fn save_artifact(&self, failure: &FlowFailure) {
        let Some(artifact) = &failure.artifact else {
            return;
        };
        if let Err(e) = self.artifacts.persist(artifact).await {
            warn!(
                "⚠️ 保存诊断页面失败 ({}): {}",
                self.artifacts.dir().display(),
                e
            );
        }
    }

    /// 关闭会话池
    pub fn shutdown(&self) {
        self.pool.close();
        info!("会话池已关闭");
    }
}
