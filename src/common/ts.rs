use crate::common::error::BotError;
use crate::models::{DispatchRecord, PriceQuote};
use async_trait::async_trait;

// 策略 trait，使用泛型输入而不是 trait object
pub trait Strategy<T>: Send + Sync {
    type Output;
    fn on_price_update(&mut self, input: T) -> Self::Output;
    fn name(&self) -> String;
}

/// 价格来源：每个 tick 调用一次
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Result<PriceQuote, BotError>;
}

/// 通知通道：一次调用只投递到一个目标
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 所有投递目标
    fn destinations(&self) -> Vec<String>;

    async fn send(&self, destination: &str, text: &str) -> Result<(), BotError>;
}

/// 信号存储：只追加，按插入顺序读取
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn append(&self, record: &DispatchRecord) -> Result<(), BotError>;

    async fn read_all(&self) -> Result<Vec<DispatchRecord>, BotError>;

    async fn clear(&self) -> Result<(), BotError>;
}
