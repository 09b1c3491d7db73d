use crate::common::enums::Direction;
use crate::common::ts::Strategy;
use crate::strategy::rolling_window::RollingWindow;

pub const DEFAULT_LOOKBACK: usize = 20;
pub const DEFAULT_SENSITIVITY: f64 = 1.0;

/// 通道突破检测
///
/// 取最近 `lookback` 个价格的最高/最低点，缓冲为通道宽度的
/// `sensitivity * 10%`。前一价格在上沿缓冲带之下、当前价格进入上沿缓冲带时
/// 为 BUY；下沿对称为 SELL。样本不足 `lookback + 2` 时不出信号。
pub fn detect(prices: &[f64], lookback: usize, sensitivity: f64) -> Option<Direction> {
    if lookback == 0 || prices.len() < lookback + 2 {
        return None;
    }

    let recent = &prices[prices.len() - lookback..];
    let highest_high = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest_low = recent.iter().copied().fold(f64::INFINITY, f64::min);
    let current = prices[prices.len() - 1];
    let previous = prices[prices.len() - 2];

    // 通道完全走平时 buffer 为 0，比较退化为严格穿越
    let buffer = (highest_high - lowest_low) * sensitivity * 0.1;
    let upper = highest_high - buffer;
    let lower = lowest_low + buffer;

    if previous < upper && current >= upper {
        Some(Direction::Buy)
    } else if previous > lower && current <= lower {
        Some(Direction::Sell)
    } else {
        None
    }
}

/// 以策略形式封装的通道突破检测
#[derive(Debug, Clone)]
pub struct ChannelBreakoutStrategy {
    pub lookback: usize,
    pub sensitivity: f64,
}

impl ChannelBreakoutStrategy {
    pub fn new(lookback: usize, sensitivity: f64) -> Self {
        Self { lookback, sensitivity }
    }
}

impl Default for ChannelBreakoutStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK, DEFAULT_SENSITIVITY)
    }
}

impl Strategy<&RollingWindow> for ChannelBreakoutStrategy {
    type Output = Option<Direction>;

    fn on_price_update(&mut self, input: &RollingWindow) -> Self::Output {
        detect(&input.prices(), self.lookback, self.sensitivity)
    }

    fn name(&self) -> String {
        "CHANNEL_BREAKOUT".to_string()
    }
}
