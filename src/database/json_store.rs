use crate::common::error::BotError;
use crate::common::ts::SignalStore;
use crate::models::DispatchRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// JSON 文件信号存储
///
/// 文件内容是一个 JSON 数组，只保留最近 `retention` 条。写入先落临时文件再 rename。
pub struct JsonSignalStore {
    path: PathBuf,
    retention: usize,
    // 串行化读-改-写
    lock: Mutex<()>,
}

impl JsonSignalStore {
    pub fn new(path: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            path: path.into(),
            retention,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<DispatchRecord>, BotError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BotError::PersistenceFailure(format!("{}: {}", self.path.display(), e))),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| BotError::PersistenceFailure(format!("{}: {}", self.path.display(), e)))
    }

    async fn save(&self, records: &[DispatchRecord]) -> Result<(), BotError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| BotError::PersistenceFailure(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| BotError::PersistenceFailure(format!("{}: {}", tmp_path.display(), e)))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| BotError::PersistenceFailure(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl SignalStore for JsonSignalStore {
    async fn append(&self, record: &DispatchRecord) -> Result<(), BotError> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        records.push(record.clone());
        if records.len() > self.retention {
            let overflow = records.len() - self.retention;
            records.drain(..overflow);
        }
        self.save(&records).await
    }

    async fn read_all(&self) -> Result<Vec<DispatchRecord>, BotError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn clear(&self) -> Result<(), BotError> {
        let _guard = self.lock.lock().await;
        self.save(&[]).await
    }
}
