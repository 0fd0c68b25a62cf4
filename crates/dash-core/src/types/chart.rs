//! 가격 차트 표시 방식.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 가격 차트 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// 캔들스틱 (시가/고가/저가/종가)
    #[default]
    Candlestick,
    /// 종가 라인
    Line,
}

impl ChartType {
    /// 다른 유형으로 전환합니다.
    pub fn toggle(self) -> Self {
        match self {
            ChartType::Candlestick => ChartType::Line,
            ChartType::Line => ChartType::Candlestick,
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartType::Candlestick => f.write_str("Candlestick"),
            ChartType::Line => f.write_str("Line"),
        }
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "candlestick" | "candle" | "candles" => Ok(ChartType::Candlestick),
            "line" => Ok(ChartType::Line),
            _ => Err(format!("Unknown chart type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_type_parse_and_toggle() {
        assert_eq!("Line".parse::<ChartType>().unwrap(), ChartType::Line);
        assert_eq!("candle".parse::<ChartType>().unwrap(), ChartType::Candlestick);
        assert!("bar".parse::<ChartType>().is_err());
        assert_eq!(ChartType::Candlestick.toggle(), ChartType::Line);
    }
}
