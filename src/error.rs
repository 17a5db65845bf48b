use std::time::Duration;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验错误
    #[error("输入错误: {0}")]
    Validation(#[from] ValidationError),
    /// 浏览器/HTTP 会话错误
    #[error("会话错误: {0}")]
    Driver(#[from] DriverFailure),
    /// 成绩单网站返回的错误
    #[error("成绩单网站错误: {0}")]
    Portal(#[from] PortalError),
    /// 成绩表解析错误
    #[error("成绩表解析错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 会话池 / 限流错误
    #[error("资源池错误: {0}")]
    Pool(#[from] PoolError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 输入校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 学号格式错误
    #[error("学号 '{value}' 无效: {reason}")]
    InvalidInput { value: String, reason: &'static str },
    /// 未知的成绩单类别
    #[error("未知的成绩单类别: {0}")]
    UnknownCategory(String),
    /// 不在允许列表中的专业代码
    #[error("未知的专业代码: {0}")]
    UnknownProgram(String),
}

/// 会话驱动错误
///
/// 除 `Cancelled` 外都属于瞬时错误，由调用方按重试策略处理
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverFailure {
    /// 页面控件不存在或不可交互
    #[error("页面控件不可用: {field}")]
    ElementUnavailable { field: String },
    /// 等待页面响应超时
    #[error("等待页面响应超时 ({secs} 秒)")]
    Timeout { secs: u64 },
    /// 会话初始化失败（浏览器启动 / 连接失败）
    #[error("会话初始化失败: {message}")]
    TransportInitFailure { message: String },
    /// 会话进行中的协议错误
    #[error("会话协议错误: {message}")]
    Protocol { message: String },
    /// 调用方取消
    #[error("操作已取消")]
    Cancelled,
}

impl DriverFailure {
    pub fn element_unavailable(field: impl Into<String>) -> Self {
        DriverFailure::ElementUnavailable {
            field: field.into(),
        }
    }

    pub fn timeout(waited: Duration) -> Self {
        DriverFailure::Timeout {
            secs: waited.as_secs(),
        }
    }

    pub fn init_failed(message: impl std::fmt::Display) -> Self {
        DriverFailure::TransportInitFailure {
            message: message.to_string(),
        }
    }

    pub fn protocol(message: impl std::fmt::Display) -> Self {
        DriverFailure::Protocol {
            message: message.to_string(),
        }
    }

    /// 是否允许重试
    pub fn is_transient(&self) -> bool {
        !matches!(self, DriverFailure::Cancelled)
    }
}

/// 成绩单网站返回的语义错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    /// 出现验证码，需要人工验证
    #[error("检测到验证码，请稍后重试或手动访问网站完成验证")]
    CaptchaChallenge,
    /// 网站给出的错误提示
    #[error("网站返回错误: {message}")]
    ServerMessage { message: String },
    /// 页面中没有成绩表
    #[error("页面中未找到成绩表，请确认学号与专业代码是否匹配")]
    TableNotFound,
}

/// 成绩表解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// 过滤后没有有效数据行
    #[error("成绩表中没有有效数据行")]
    NoRows,
    /// 缺少必需的列
    #[error("成绩表缺少列: {0}")]
    MissingColumn(String),
}

/// 会话池错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// 超过限流窗口
    #[error("请求过于频繁，请在 {} 秒后重试", .retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },
    /// 并发会话已满且等待超时
    #[error("并发会话已满 (上限 {limit})")]
    Busy { limit: usize },
    /// 会话池已关闭
    #[error("会话池已关闭")]
    Closed,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {field} 的值 '{value}' 不合法: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 面向用户的错误提示类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCategory {
    /// 暂时性问题，稍后重试
    RetryInProgress,
    /// 需要人工验证（验证码）
    NeedsManualVerification,
    /// 输入有误
    InvalidInput,
    /// 未找到成绩
    NotFound,
    /// 运行环境问题
    Unexpected,
}

impl MessageCategory {
    /// 用户可读的提示
    pub fn user_message(self) -> &'static str {
        match self {
            MessageCategory::RetryInProgress => "⏳ 网站暂时无法访问，请稍后重试",
            MessageCategory::NeedsManualVerification => {
                "❌ 检测到验证码，请稍后重试或手动访问网站完成验证"
            }
            MessageCategory::InvalidInput => "❌ 输入有误，学号必须为 9 或 10 位数字",
            MessageCategory::NotFound => "❌ 未找到成绩单，请确认学号与专业代码是否正确",
            MessageCategory::Unexpected => "❌ 运行失败，请查看日志",
        }
    }
}

impl AsRef<DriverFailure> for DriverFailure {
    fn as_ref(&self) -> &DriverFailure {
        self
    }
}

// ========== 从第三方错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for DriverFailure {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        DriverFailure::protocol(err)
    }
}

impl From<serde_json::Error> for DriverFailure {
    fn from(err: serde_json::Error) -> Self {
        DriverFailure::protocol(err)
    }
}

impl From<reqwest::Error> for DriverFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_builder() {
            DriverFailure::init_failed(err)
        } else {
            DriverFailure::protocol(err)
        }
    }
}

impl AppError {
    /// 是否属于可重试的瞬时错误
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Driver(e) => e.is_transient(),
            _ => false,
        }
    }

    /// 映射到面向用户的提示类别
    pub fn category(&self) -> MessageCategory {
        match self {
            AppError::Validation(_) => MessageCategory::InvalidInput,
            AppError::Driver(DriverFailure::Cancelled) => MessageCategory::Unexpected,
            AppError::Driver(_) | AppError::Pool(_) => MessageCategory::RetryInProgress,
            AppError::Portal(PortalError::CaptchaChallenge) => {
                MessageCategory::NeedsManualVerification
            }
            AppError::Portal(_) | AppError::Extraction(_) => MessageCategory::NotFound,
            AppError::Config(_) | AppError::Io(_) => MessageCategory::Unexpected,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_failures() {
        assert!(DriverFailure::timeout(Duration::from_secs(60)).is_transient());
        assert!(DriverFailure::element_unavailable("txtEnrno").is_transient());
        assert!(DriverFailure::init_failed("no chromium").is_transient());
        assert!(!DriverFailure::Cancelled.is_transient());

        assert!(!AppError::from(PortalError::CaptchaChallenge).is_transient());
        assert!(!AppError::from(ExtractionError::NoRows).is_transient());
    }

    #[test]
    fn test_message_categories_are_distinct() {
        let invalid = AppError::from(ValidationError::UnknownProgram("XYZ".into()));
        let captcha = AppError::from(PortalError::CaptchaChallenge);
        let server = AppError::from(PortalError::ServerMessage {
            message: "Invalid Enrolment".into(),
        });
        let timeout = AppError::from(DriverFailure::timeout(Duration::from_secs(60)));

        assert_eq!(invalid.category(), MessageCategory::InvalidInput);
        assert_eq!(captcha.category(), MessageCategory::NeedsManualVerification);
        assert_eq!(server.category(), MessageCategory::NotFound);
        assert_eq!(timeout.category(), MessageCategory::RetryInProgress);
        assert_ne!(
            MessageCategory::NotFound.user_message(),
            MessageCategory::InvalidInput.user_message()
        );
    }
}
