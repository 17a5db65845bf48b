//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (持有 SessionPool / TransportProvider)
//!     ↓
//! workflow::GradeFlow (一次查询：重试 → 分类 → 解析 → 计算)
//!     ↓
//! services (能力层：validator / session_driver / classifier / table_extractor / score_calculator)
//!     ↓
//! infrastructure (基础设施：Transport / SessionPool)
//! ```

pub mod app;

pub use app::App;
