use serde::{Deserialize, Serialize};
use std::fmt;

/// 通道突破方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }

    /// 对外发布时的方向：BUY -> UP, SELL -> DOWN
    pub fn to_candle(self) -> CandleDirection {
        match self {
            Direction::Buy => CandleDirection::Up,
            Direction::Sell => CandleDirection::Down,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 下一根 K 线的预期方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CandleDirection {
    Up,
    Down,
}

impl CandleDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandleDirection::Up => "UP",
            CandleDirection::Down => "DOWN",
        }
    }
}

impl fmt::Display for CandleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_mapping() {
        assert_eq!(Direction::Buy.to_candle(), CandleDirection::Up);
        assert_eq!(Direction::Sell.to_candle(), CandleDirection::Down);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Direction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&CandleDirection::Down).unwrap(), "\"DOWN\"");
        let parsed: CandleDirection = serde_json::from_str("\"UP\"").unwrap();
        assert_eq!(parsed, CandleDirection::Up);
    }
}
