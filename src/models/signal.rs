use crate::common::enums::{CandleDirection, Direction};
use crate::common::utils::{format_clock, format_timestamp};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// 已准备、等待发送的信号
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub direction: Direction,
    pub pair: String,
    pub price: f64,
    pub prepared_at: DateTime<Local>,
}

impl Signal {
    pub fn new(direction: Direction, pair: impl Into<String>, price: f64, prepared_at: DateTime<Local>) -> Self {
        Self {
            direction,
            pair: pair.into(),
            price,
            prepared_at,
        }
    }

    /// 在发送时刻生成发送记录
    pub fn into_record(self, dispatched_at: DateTime<Local>) -> DispatchRecord {
        DispatchRecord {
            timestamp: format_timestamp(&dispatched_at),
            time: format_clock(&self.prepared_at),
            pair: self.pair,
            signal: self.direction,
            direction: self.direction.to_candle(),
            price: self.price,
        }
    }
}

/// 已发送信号的记录，写入存储与文本日志后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRecord {
    /// 发送时间 `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
    /// 信号准备时刻 `%H:%M:%S`
    pub time: String,
    pub pair: String,
    pub signal: Direction,
    pub direction: CandleDirection,
    pub price: f64,
}

impl DispatchRecord {
    /// 文本日志行：`<timestamp> - <pair> - <direction>`
    pub fn log_line(&self) -> String {
        format!("{} - {} - {}", self.timestamp, self.pair, self.direction)
    }

    /// 推送给操作员的消息
    pub fn notification_text(&self, dispatched_at: &DateTime<Local>) -> String {
        format!(
            "{} - {} - {} (Next Candle)",
            format_clock(dispatched_at),
            self.pair,
            self.direction
        )
    }
}
