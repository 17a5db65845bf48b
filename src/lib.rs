//! # Gradecard Calculator
//!
//! 查询 IGNOU 成绩单并计算加权百分比
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器 / HTTP 会话），只暴露能力
//! - `Transport` - 导航、定位、填值、点击、等待、读页面
//! - `SessionPool` - 并发会话上限 + 滑动窗口限流
//!
//! ### ② 业务能力层（Services）
//! - `validator` - 学号校验
//! - `SessionDriver` - 一次表单提交
//! - `classifier` - 验证码 / 网站错误 / 成绩表
//! - `table_extractor` - 成绩表 → 课程记录
//! - `score_calculator` - 30% 作业 + 70% 考试
//!
//! ### ③ 流程层（Workflow）
//! - `RetryPolicy` - 重试状态机
//! - `GradeFlow` - 一次完整查询
//!
//! ### ④ 编排层（Orchestration）
//! - `App` - 配置、资源和诊断页面保存

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, MessageCategory};
pub use models::{CourseRecord, GradeSummary, GradecardCategory, ProgramCode, SubmissionRequest};
pub use orchestrator::App;
pub use workflow::{FlowFailure, GradeFlow, GradeReport};
