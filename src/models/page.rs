use std::fmt;

/// 远程会话返回的原始页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResultPage {
    markup: String,
}

impl RawResultPage {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.markup
    }

    pub fn into_markup(self) -> String {
        self.markup
    }
}

/// 页面分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedResponse {
    /// 验证码页面
    CaptchaChallenge,
    /// 网站给出的错误提示
    ServerError(String),
    /// 既没有提示也没有成绩表
    TableNotFound,
    /// 成绩表 HTML
    ResultTable(String),
}

/// 诊断页面产生的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactReason {
    Captcha,
    ServerError,
    TableNotFound,
    Extraction,
    /// 重试耗尽时最后一次尝试停留的页面
    RetriesExhausted,
}

impl ArtifactReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactReason::Captcha => "captcha",
            ArtifactReason::ServerError => "server_error",
            ArtifactReason::TableNotFound => "table_not_found",
            ArtifactReason::Extraction => "extraction",
            ArtifactReason::RetriesExhausted => "retries_exhausted",
        }
    }
}

impl fmt::Display for ArtifactReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 失败时保留的页面，由外部决定是否落盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticArtifact {
    pub reason: ArtifactReason,
    pub markup: String,
}

impl DiagnosticArtifact {
    pub fn new(reason: ArtifactReason, page: RawResultPage) -> Self {
        Self {
            reason,
            markup: page.into_markup(),
        }
    }
}
