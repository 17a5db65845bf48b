//! 诊断页面写入服务
//!
//! 只负责把失败时的页面保存到磁盘，不关心流程

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::models::DiagnosticArtifact;

/// 诊断页面写入服务
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 保存页面，返回文件路径
    pub async fn persist(&self, artifact: &DiagnosticArtifact) -> std::io::Result<PathBuf> {
        debug!(
            "写入诊断页面: 原因 {} | 长度: {}",
            artifact.reason,
            artifact.markup.len()
        );

        fs::create_dir_all(&self.dir).await?;
        let file_name = format!(
            "gradecard_{}_{}.html",
            artifact.reason,
            chrono::Local::now().format("%Y%m%d_%H%M%S_%3f")
        );
        let path = self.dir.join(file_name);
        fs::write(&path, artifact.markup.as_bytes()).await?;

        info!("页面已保存至: {}", path.display());
        Ok(path)
    }
}

impl Default for ArtifactWriter {
    fn default() -> Self {
        Self::new("artifacts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtifactReason, RawResultPage};

    #[tokio::test]
    async fn test_persist_writes_markup() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("nested"));
        let artifact = DiagnosticArtifact::new(
            ArtifactReason::Captcha,
            RawResultPage::new("<html>captcha</html>"),
        );

        let path = writer.persist(&artifact).await.unwrap();
        assert!(path.starts_with(dir.path().join("nested")));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("gradecard_captcha_"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>captcha</html>");
    }
}
