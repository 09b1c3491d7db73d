use crate::common::error::BotError;
use crate::factory::signal_bot_fac::SignalBot;
use crate::system_log;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// 每次启动时构建一个全新的机器人（状态不跨次保留）
pub type BotFactory = Arc<dyn Fn() -> Result<SignalBot, BotError> + Send + Sync>;

struct RunningBot {
    run_id: u64,
    started_at: DateTime<Local>,
    handle: JoinHandle<()>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(u64),
    AlreadyRunning(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped(u64),
    NotRunning,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub running: bool,
    pub run_id: Option<u64>,
    pub started_at: Option<String>,
}

/// 机器人生命周期管理
///
/// 持有后台任务句柄；start/stop 幂等，内部锁保证并发 start 只会启动一次。
pub struct BotSupervisor {
    factory: BotFactory,
    current: Mutex<Option<RunningBot>>,
    next_run_id: AtomicU64,
}

impl BotSupervisor {
    pub fn new(factory: BotFactory) -> Self {
        Self {
            factory,
            current: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
        }
    }

    pub async fn start(&self) -> Result<StartOutcome, BotError> {
        let mut current = self.current.lock().await;

        if let Some(running) = current.as_ref() {
            if !running.handle.is_finished() {
                return Ok(StartOutcome::AlreadyRunning(running.run_id));
            }
        }

        let bot = match (self.factory)() {
            Ok(bot) => bot,
            Err(e) => {
                if e.is_recoverable() {
                    system_log!(warn, "⚠ 机器人启动失败: {}", e);
                } else {
                    system_log!(error, "❌ 机器人配置错误，无法启动: {}", e);
                }
                return Err(e);
            }
        };
        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let handle = tokio::spawn(bot.run());
        *current = Some(RunningBot {
            run_id,
            started_at: Local::now(),
            handle,
        });

        system_log!(info, "▶️ 机器人已启动 run_id={}", run_id);
        Ok(StartOutcome::Started(run_id))
    }

    pub async fn stop(&self) -> StopOutcome {
        let mut current = self.current.lock().await;

        match current.take() {
            Some(running) if !running.handle.is_finished() => {
                running.handle.abort();
                // 等待任务真正退出
                let _ = running.handle.await;
                system_log!(info, "⏹️ 机器人已停止 run_id={}", running.run_id);
                StopOutcome::Stopped(running.run_id)
            }
            _ => StopOutcome::NotRunning,
        }
    }

    pub async fn status(&self) -> BotStatus {
        let current = self.current.lock().await;
        match current.as_ref() {
            Some(running) if !running.handle.is_finished() => BotStatus {
                running: true,
                run_id: Some(running.run_id),
                started_at: Some(running.started_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            },
            _ => BotStatus {
                running: false,
                run_id: None,
                started_at: None,
            },
        }
    }

    pub async fn is_running(&self) -> bool {
        self.status().await.running
    }
}
