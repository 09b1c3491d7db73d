use crate::common::config::AppConfig;
use crate::common::error::BotError;
use crate::common::ts::{Notifier, PriceSource, SignalStore};
use crate::common::utils::until_next_second;
use crate::database::{JsonSignalStore, TextSignalLog};
use crate::models::DispatchRecord;
use crate::notify::TelegramNotifier;
use crate::schedulers::{SignalScheduler, TickOutcome};
use crate::source::HttpPriceSource;
use crate::{signal_log, system_log};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// 单次发送的结果统计
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub record: DispatchRecord,
    pub stored: bool,
    pub notified: usize,
    pub failed: usize,
    pub logged: bool,
}

/// 单个 tick 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TickReport {
    /// 取价失败，按退避时间跳过本 tick
    SampleUnavailable,
    Idle,
    Prepared,
    Dispatched(DispatchReport),
}

/// 信号机器人：取价 → 调度 → 存储/通知/文本日志
///
/// 单任务顺序循环，窗口与待发送槽位只在本任务内修改。
pub struct SignalBot {
    source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn SignalStore>,
    text_log: TextSignalLog,
    scheduler: SignalScheduler,
    tick_interval: Duration,
    fetch_backoff: Duration,
    notify_timeout: Duration,
    clear_on_start: bool,
}

impl SignalBot {
    pub fn new(
        config: &AppConfig,
        source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn SignalStore>,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            text_log: TextSignalLog::new(&config.storage.text_log_path),
            scheduler: SignalScheduler::new(&config.bot),
            tick_interval: config.bot.tick_interval(),
            fetch_backoff: config.bot.fetch_backoff(),
            notify_timeout: config.telegram.timeout(),
            clear_on_start: config.storage.clear_on_start,
        }
    }

    /// 用 HTTP 价格源、Telegram 通知和给定存储组装机器人
    pub fn from_config(config: &AppConfig, store: Arc<dyn SignalStore>) -> Result<Self, BotError> {
        let source = Arc::new(HttpPriceSource::new(&config.source)?);
        let notifier = Arc::new(TelegramNotifier::new(&config.telegram));
        Ok(Self::new(config, source, notifier, store))
    }

    /// 用 JSON 文件存储组装机器人
    pub fn from_config_with_json_store(config: &AppConfig) -> Result<Self, BotError> {
        let store = Arc::new(JsonSignalStore::new(
            &config.storage.json_path,
            config.storage.retention,
        ));
        Self::from_config(config, store)
    }

    pub fn scheduler(&self) -> &SignalScheduler {
        &self.scheduler
    }

    /// 主循环，永不返回；停止由外部中止任务完成
    pub async fn run(mut self) {
        system_log!(info, "🚀 信号机器人启动");
        self.prepare_store().await;

        loop {
            let report = self.tick(Local::now()).await;
            let delay = self.next_delay(&report, &Local::now());
            tokio::time::sleep(delay).await;
        }
    }

    /// 启动时按配置清空 JSON 存储
    pub async fn prepare_store(&self) {
        if !self.clear_on_start {
            return;
        }
        match self.store.clear().await {
            Ok(()) => info!("🧹 已清空信号存储"),
            Err(e) => error!("❌ 清空信号存储失败: {}", e),
        }
    }

    /// 执行一次 tick
    pub async fn tick(&mut self, now: DateTime<Local>) -> TickReport {
        let quote = match self.source.fetch().await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("⚠ 获取价格失败: {}", e);
                return TickReport::SampleUnavailable;
            }
        };

        match self.scheduler.on_sample(quote, now) {
            TickOutcome::Nothing => TickReport::Idle,
            TickOutcome::Prepared(_) => TickReport::Prepared,
            TickOutcome::Dispatched(record) => TickReport::Dispatched(self.dispatch(record, now).await),
        }
    }

    /// 发送：存储 → 通知 → 文本日志，任何一步失败都只记录日志
    async fn dispatch(&self, record: DispatchRecord, now: DateTime<Local>) -> DispatchReport {
        let stored = match self.store.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                error!("❌ 保存信号失败: {}", e);
                false
            }
        };

        let text = record.notification_text(&now);
        let mut notified = 0;
        let mut failed = 0;
        for destination in self.notifier.destinations() {
            match tokio::time::timeout(self.notify_timeout, self.notifier.send(&destination, &text)).await {
                Ok(Ok(())) => notified += 1,
                Ok(Err(e)) => {
                    warn!("⚠ 通知失败: {}", e);
                    failed += 1;
                }
                Err(_) => {
                    let e = BotError::NotificationTimeout {
                        destination: destination.clone(),
                        secs: self.notify_timeout.as_secs(),
                    };
                    warn!("⚠ 通知超时: {}", e);
                    failed += 1;
                }
            }
        }

        let logged = match self.text_log.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                error!("❌ 写入文本日志失败: {}", e);
                false
            }
        };

        signal_log!(info, "✅ 下一根K线信号已发送: {}", text);

        DispatchReport {
            record,
            stored,
            notified,
            failed,
            logged,
        }
    }

    /// 取价失败走固定退避，其余按采样节奏
    fn next_delay(&self, report: &TickReport, now: &DateTime<Local>) -> Duration {
        match report {
            TickReport::SampleUnavailable => self.fetch_backoff,
            _ => self.pacing(now),
        }
    }

    /// 下一次 tick 前的等待：对齐到墙钟整秒，避免跳过发送秒位
    fn pacing(&self, now: &DateTime<Local>) -> Duration {
        let one_second = Duration::from_secs(1);
        if self.tick_interval < one_second {
            return self.tick_interval;
        }
        self.tick_interval - one_second + until_next_second(now)
    }
}
