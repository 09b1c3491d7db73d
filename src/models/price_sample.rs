use chrono::{DateTime, Local};

/// 单次采样的价格
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub value: f64,
    pub observed_at: DateTime<Local>,
}

impl PriceSample {
    pub fn new(value: f64, observed_at: DateTime<Local>) -> Self {
        Self { value, observed_at }
    }
}

/// 价格来源返回的报价：价格 + 交易对标签
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
    pub pair: String,
}

impl PriceQuote {
    pub fn new(price: f64, pair: impl Into<String>) -> Self {
        Self {
            price,
            pair: pair.into(),
        }
    }
}
