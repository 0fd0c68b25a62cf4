//! 시장 데이터 타입.
//!
//! - `Kline` - OHLCV 캔들스틱 데이터

use crate::types::Timeframe;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들스틱 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// 거래 심볼 (예: BTCUSDT)
    pub ticker: String,
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 캔들 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량 (기준 자산 단위)
    pub volume: Decimal,
    /// 캔들 종료 시간
    pub close_time: DateTime<Utc>,
    /// 거래대금 (호가 자산 단위)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_volume: Option<Decimal>,
    /// 체결 건수
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_trades: Option<u64>,
}

impl Kline {
    /// 가격과 거래량만으로 캔들을 생성합니다.
    ///
    /// 종료 시간은 `open_time + timeframe - 1ms`로 채웁니다.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: impl Into<String>,
        timeframe: Timeframe,
        open_time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        let close_time = open_time + timeframe.duration() - chrono::Duration::milliseconds(1);
        Self {
            ticker: ticker.into(),
            timeframe,
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
            quote_volume: None,
            num_trades: None,
        }
    }

    /// 양봉(종가 >= 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}
