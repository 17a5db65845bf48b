use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 会话传输方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// chromiumoxide 驱动的浏览器
    Browser,
    /// reqwest 直接提交表单
    Http,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(TransportKind::Browser),
            "http" => Ok(TransportKind::Http),
            _ => Err(ConfigError::InvalidValue {
                field: "transport",
                value: s.to_string(),
                reason: "只支持 browser 或 http",
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 成绩单页面 URL
    pub target_url: String,
    /// 会话传输方式
    pub transport: TransportKind,
    /// 浏览器调试端口，0 表示自行启动无头浏览器
    pub browser_debug_port: u16,
    /// Chromium 可执行文件路径（为空时自动查找）
    pub chrome_executable: Option<String>,
    /// 等待页面控件的秒数
    pub element_wait_secs: u64,
    /// 提交后等待结果的秒数
    pub result_wait_secs: u64,
    /// 瞬时错误的最大重试次数
    pub max_retries: usize,
    /// 两次尝试之间的间隔秒数
    pub retry_delay_secs: u64,
    /// 同时存在的会话上限
    pub max_concurrent_sessions: usize,
    /// 限流窗口内允许的请求数
    pub rate_limit_max: usize,
    /// 限流窗口秒数
    pub rate_limit_window_secs: u64,
    /// 诊断页面保存目录
    pub artifact_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://gradecard.ignou.ac.in/gradecard/".to_string(),
            transport: TransportKind::Browser,
            browser_debug_port: 0,
            chrome_executable: None,
            element_wait_secs: 60,
            result_wait_secs: 60,
            max_retries: 2,
            retry_delay_secs: 5,
            max_concurrent_sessions: 5,
            rate_limit_max: 10,
            rate_limit_window_secs: 60,
            artifact_dir: "artifacts".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，环境变量优先
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        let base = self;
        Self {
            target_url: std::env::var("TARGET_URL").unwrap_or(base.target_url),
            transport: std::env::var("TRANSPORT").ok().and_then(|v| v.parse().ok()).unwrap_or(base.transport),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(base.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(base.chrome_executable),
            element_wait_secs: std::env::var("ELEMENT_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.element_wait_secs),
            result_wait_secs: std::env::var("RESULT_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.result_wait_secs),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_retries),
            retry_delay_secs: std::env::var("RETRY_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.retry_delay_secs),
            max_concurrent_sessions: std::env::var("MAX_CONCURRENT_SESSIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_concurrent_sessions),
            rate_limit_max: std::env::var("RATE_LIMIT_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(base.rate_limit_max),
            rate_limit_window_secs: std::env::var("RATE_LIMIT_WINDOW_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.rate_limit_window_secs),
            artifact_dir: std::env::var("ARTIFACT_DIR").unwrap_or(base.artifact_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("element_wait_secs", self.element_wait_secs as usize),
            ("result_wait_secs", self.result_wait_secs as usize),
            ("max_concurrent_sessions", self.max_concurrent_sessions),
            ("rate_limit_max", self.rate_limit_max),
            ("rate_limit_window_secs", self.rate_limit_window_secs as usize),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: value.to_string(),
                    reason: "必须大于 0",
                });
            }
        }
        if !self.target_url.starts_with("http://") && !self.target_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "target_url",
                value: self.target_url.clone(),
                reason: "必须是 http(s) 地址",
            });
        }
        Ok(())
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn result_wait(&self) -> Duration {
        Duration::from_secs(self.result_wait_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_concurrent_sessions, 5);
        assert_eq!(config.rate_limit_max, 10);
        assert_eq!(config.result_wait(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = Config {
            max_concurrent_sessions: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "max_concurrent_sessions",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            transport = "http"
            max_retries = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.transport, TransportKind::Http);
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.retry_delay_secs, 5);
        assert_eq!(config.target_url, Config::default().target_url);
    }

    #[test]
    fn test_missing_toml_file() {
        let result = Config::from_toml_file(Path::new("/nonexistent/gradecard.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }
}
