use crate::common::config::BotConfig;
use crate::common::ts::Strategy;
use crate::common::utils::second_of_minute;
use crate::models::{DispatchRecord, PriceQuote, PriceSample, Signal};
use crate::signal_log;
use crate::strategy::{ChannelBreakoutStrategy, RollingWindow};
use chrono::{DateTime, Duration, Local};

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// 没有待发送信号
    Idle,
    /// 持有一个待发送信号
    Pending,
}

/// 单个 tick 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// 本 tick 没有状态变化
    Nothing,
    /// 准备了新信号（可能覆盖了未发送的旧信号）
    Prepared(Signal),
    /// 到达发送秒位，待发送信号已转为记录，槽位已清空
    Dispatched(DispatchRecord),
}

/// 信号调度器
///
/// 每个 tick 推入一个样本；在冷却期外且秒位早于发送秒位时运行突破检测，
/// 命中则写入唯一的待发送槽位并开始冷却；到达发送秒位时取出槽位生成记录。
/// 冷却从准备时刻起算，与槽位是否已清空无关。
pub struct SignalScheduler {
    window: RollingWindow,
    strategy: ChannelBreakoutStrategy,
    pending: Option<Signal>,
    last_prepared_at: Option<DateTime<Local>>,
    cooldown: Duration,
    dispatch_second: u32,
}

impl SignalScheduler {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            window: RollingWindow::new(config.window_capacity),
            strategy: ChannelBreakoutStrategy::new(config.lookback, config.sensitivity),
            pending: None,
            last_prepared_at: None,
            cooldown: config.cooldown(),
            dispatch_second: config.dispatch_second,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.pending.is_some() {
            SchedulerState::Pending
        } else {
            SchedulerState::Idle
        }
    }

    pub fn pending(&self) -> Option<&Signal> {
        self.pending.as_ref()
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    /// 冷却是否仍在生效
    pub fn cooldown_active(&self, now: &DateTime<Local>) -> bool {
        match self.last_prepared_at {
            Some(prepared_at) => *now < prepared_at + self.cooldown,
            None => false,
        }
    }

    /// 处理一个成功取到的样本
    pub fn on_sample(&mut self, quote: PriceQuote, now: DateTime<Local>) -> TickOutcome {
        self.window.push(PriceSample::new(quote.price, now));

        let second = second_of_minute(&now);

        // 准备窗口
        if !self.cooldown_active(&now) && second < self.dispatch_second {
            if let Some(direction) = self.strategy.on_price_update(&self.window) {
                let signal = Signal::new(direction, quote.pair, quote.price, now);
                if let Some(previous) = self.pending.replace(signal.clone()) {
                    signal_log!(
                        warn,
                        "♻️ 覆盖未发送信号: {} {} @ {}",
                        previous.pair,
                        previous.direction,
                        previous.price
                    );
                }
                self.last_prepared_at = Some(now);
                signal_log!(
                    info,
                    "📌 已准备下一根K线信号: {} {} @ {}",
                    signal.pair,
                    signal.direction,
                    signal.price
                );
                return TickOutcome::Prepared(signal);
            }
        }

        // 发送边界
        if second == self.dispatch_second {
            if let Some(signal) = self.pending.take() {
                return TickOutcome::Dispatched(signal.into_record(now));
            }
        }

        TickOutcome::Nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::enums::{CandleDirection, Direction};
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 1, h, m, s).unwrap()
    }

    fn quote(price: f64) -> PriceQuote {
        PriceQuote::new(price, "EUR/USD")
    }

    /// 灌入 21 个平稳价格，下一个 101 即触发 BUY
    fn warmed_up(start: DateTime<Local>) -> (SignalScheduler, DateTime<Local>) {
        let mut scheduler = SignalScheduler::new(&BotConfig::default());
        let mut now = start;
        for _ in 0..21 {
            assert_eq!(scheduler.on_sample(quote(100.0), now), TickOutcome::Nothing);
            now = now + Duration::seconds(1);
        }
        (scheduler, now)
    }

    #[test]
    fn test_prepare_then_dispatch_at_second_53() {
        let (mut scheduler, now) = warmed_up(at(10, 0, 0));
        assert_eq!(now, at(10, 0, 21));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        let outcome = scheduler.on_sample(quote(101.0), now);
        assert!(matches!(outcome, TickOutcome::Prepared(ref s) if s.direction == Direction::Buy));
        assert_eq!(scheduler.state(), SchedulerState::Pending);

        // 22..52 秒之间保持 Pending
        let mut t = now + Duration::seconds(1);
        while second_of_minute(&t) < 53 {
            assert_eq!(scheduler.on_sample(quote(101.0), t), TickOutcome::Nothing);
            assert_eq!(scheduler.state(), SchedulerState::Pending);
            t = t + Duration::seconds(1);
        }

        match scheduler.on_sample(quote(101.0), at(10, 0, 53)) {
            TickOutcome::Dispatched(record) => {
                assert_eq!(record.direction, CandleDirection::Up);
                assert_eq!(record.pair, "EUR/USD");
                assert_eq!(record.price, 101.0);
                assert_eq!(record.log_line(), "2025-03-01 10:00:53 - EUR/USD - UP");
            }
            other => panic!("expected dispatch, got {:?}", other),
        }
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        // 同一秒位再次 tick 不会重复发送
        assert_eq!(scheduler.on_sample(quote(101.0), at(10, 0, 53)), TickOutcome::Nothing);
    }

    #[test]
    fn test_dispatch_second_without_pending_is_noop() {
        let mut scheduler = SignalScheduler::new(&BotConfig::default());
        assert_eq!(scheduler.on_sample(quote(1.0), at(10, 0, 53)), TickOutcome::Nothing);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_no_preparation_at_or_after_dispatch_second() {
        // 预热到 10:00:33，使第 22 个样本落在 53 秒
        let (mut scheduler, now) = warmed_up(at(10, 0, 32));
        assert_eq!(now, at(10, 0, 53));
        assert_eq!(scheduler.on_sample(quote(101.0), now), TickOutcome::Nothing);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(!scheduler.cooldown_active(&now));
    }

    #[test]
    fn test_cooldown_suppresses_after_dispatch() {
        let (mut scheduler, now) = warmed_up(at(10, 0, 0));
        let prepared_at = now;
        assert!(matches!(scheduler.on_sample(quote(101.0), now), TickOutcome::Prepared(_)));
        assert!(matches!(
            scheduler.on_sample(quote(101.0), at(10, 0, 53)),
            TickOutcome::Dispatched(_)
        ));

        // 发送后仍在冷却中：新的下破不会被准备
        assert!(scheduler.cooldown_active(&at(10, 1, 10)));
        for price in [90.0, 80.0, 70.0] {
            assert_eq!(scheduler.on_sample(quote(price), at(10, 1, 10)), TickOutcome::Nothing);
        }
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        // 冷却从准备时刻起算
        let cooldown_end = prepared_at + Duration::seconds(120);
        assert!(scheduler.cooldown_active(&(cooldown_end - Duration::seconds(1))));
        assert!(!scheduler.cooldown_active(&cooldown_end));
    }

    #[test]
    fn test_one_dispatch_per_cooldown_window() {
        let (mut scheduler, mut now) = warmed_up(at(10, 0, 0));
        let mut dispatched = 0;
        let mut prepared = 0;
        // 两分钟内持续剧烈波动
        for i in 0..120 {
            let price = if i % 2 == 0 { 150.0 } else { 50.0 };
            match scheduler.on_sample(quote(price), now) {
                TickOutcome::Prepared(_) => prepared += 1,
                TickOutcome::Dispatched(_) => dispatched += 1,
                TickOutcome::Nothing => {}
            }
            now = now + Duration::seconds(1);
        }
        assert_eq!(prepared, 1);
        assert_eq!(dispatched, 1);
    }

    #[test]
    fn test_later_detection_overwrites_pending_slot() {
        // 冷却为 0 时，发送前的后续检测会覆盖槽位（以最后一次为准）
        let config = BotConfig {
            cooldown_secs: 0,
            ..BotConfig::default()
        };
        let mut scheduler = SignalScheduler::new(&config);
        let mut now = at(10, 0, 0);
        for _ in 0..21 {
            scheduler.on_sample(quote(100.0), now);
            now = now + Duration::seconds(1);
        }
        assert!(matches!(
            scheduler.on_sample(quote(110.0), now),
            TickOutcome::Prepared(ref s) if s.direction == Direction::Buy
        ));
        now = now + Duration::seconds(1);
        // 110 之后跌回 100：previous 110 > lower 101，current 100 <= 101 → SELL
        assert!(matches!(
            scheduler.on_sample(quote(100.0), now),
            TickOutcome::Prepared(ref s) if s.direction == Direction::Sell
        ));
        assert_eq!(scheduler.pending().map(|s| s.direction), Some(Direction::Sell));

        match scheduler.on_sample(quote(100.0), at(10, 0, 53)) {
            TickOutcome::Dispatched(record) => assert_eq!(record.direction, CandleDirection::Down),
            other => panic!("expected dispatch, got {:?}", other),
        }
    }
}
