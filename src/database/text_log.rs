use crate::common::error::BotError;
use crate::models::DispatchRecord;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// 纯文本信号日志，每个已发送信号一行
#[derive(Debug, Clone)]
pub struct TextSignalLog {
    path: PathBuf,
}

impl TextSignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn append(&self, record: &DispatchRecord) -> Result<(), BotError> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| BotError::PersistenceFailure(format!("{}: {}", self.path.display(), e)))?;

        let line = format!("{}\n", record.log_line());
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| BotError::PersistenceFailure(format!("{}: {}", self.path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| BotError::PersistenceFailure(format!("{}: {}", self.path.display(), e)))
    }
}
