//! 요약 패널.
//!
//! 최근 행에서 기간별 수익률, 모멘텀, 추세 강도를 계산하고
//! 임계값에 따라 긍정/부정 마커를 붙입니다. 모든 값은 소수점 둘째 자리로
//! 반올림한 뒤 마커를 판정합니다.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::DataResult;
use crate::frame::{columns, MarketFrame};

/// 수익률 기간 (라벨, 거슬러 올라갈 행 수).
pub const RETURN_PERIODS: [(&str, usize); 4] = [
    ("1 MONTH", 20),
    ("3 MONTHS", 60),
    ("6 MONTHS", 120),
    ("12 MONTHS", 240),
];

/// 마커.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Positive,
    Negative,
}

impl Signal {
    pub fn from_bool(positive: bool) -> Self {
        if positive {
            Signal::Positive
        } else {
            Signal::Negative
        }
    }

    pub fn is_positive(self) -> bool {
        self == Signal::Positive
    }

    /// 화면 표시용 마커.
    pub fn marker(self) -> &'static str {
        match self {
            Signal::Positive => "✅",
            Signal::Negative => "🔴",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// 소수점 둘째 자리 반올림 (짝수 반올림). 표시 자릿수도 2자리로 맞춥니다.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    if rounded.is_zero() {
        // -0.00 표시 방지
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded
}

/// 수익률 마커: 0 이상이면 긍정.
pub fn returns_signal(value: Decimal) -> Signal {
    Signal::from_bool(value >= Decimal::ZERO)
}

/// EMA 마커: 현재가가 EMA 이상이면 긍정.
pub fn ema_signal(ltp: Decimal, ema: Decimal) -> Signal {
    Signal::from_bool(ltp >= ema)
}

/// RSI 마커: 30 초과 70 미만이면 긍정.
pub fn rsi_signal(rsi: Decimal) -> Signal {
    Signal::from_bool(rsi > dec!(30) && rsi < dec!(70))
}

/// ADX 마커: 25 초과면 긍정.
pub fn adx_signal(adx: Decimal) -> Signal {
    Signal::from_bool(adx > dec!(25))
}

/// `offset`행 전 대비 수익률 (%).
///
/// 행 수가 `offset` 이하이면 가장 최근 행을 기준으로 삼아 0%가 됩니다.
pub fn period_return(closes: &[Decimal], offset: usize) -> Decimal {
    let Some(&latest) = closes.last() else {
        return Decimal::ZERO;
    };
    let past = if closes.len() > offset {
        closes[closes.len() - 1 - offset]
    } else {
        latest
    };
    if past.is_zero() {
        return Decimal::ZERO;
    }
    (latest - past) / past * dec!(100)
}

/// 라벨이 붙은 값과 마커.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    /// 표시 라벨
    pub label: String,
    /// 반올림된 값 (지표가 없으면 None)
    pub value: Option<Decimal>,
    /// 마커 (표시하지 않는 항목은 None)
    pub signal: Option<Signal>,
    /// 값 뒤에 붙일 단위
    pub unit: &'static str,
}

impl SummaryEntry {
    fn new(label: &str, value: Option<Decimal>, signal: Option<Signal>) -> Self {
        Self {
            label: label.to_string(),
            value,
            signal,
            unit: "",
        }
    }

    fn percent(mut self) -> Self {
        self.unit = "%";
        self
    }
}

impl fmt::Display for SummaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{} : {}{}", self.label, v, self.unit)?,
            None => write!(f, "{} : N/A", self.label)?,
        }
        if let Some(signal) = self.signal {
            write!(f, " {}", signal)?;
        }
        Ok(())
    }
}

/// 세 컬럼 요약 패널.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub symbol: String,
    /// 1/3/6/12개월 수익률
    pub returns: Vec<SummaryEntry>,
    /// LTP, EMA20, EMA200, RSI
    pub momentum: Vec<SummaryEntry>,
    /// ADX, DMP, DMN
    pub trend_strength: Vec<SummaryEntry>,
}

impl Summary {
    /// 지표가 추가된 테이블로 요약을 계산합니다.
    ///
    /// # Errors
    /// 표준 지표 열이 없으면 `DataError::UnknownColumn`을 반환합니다.
    pub fn from_frame(frame: &MarketFrame) -> DataResult<Self> {
        let closes = frame.close();
        let ltp = closes.last().copied().map(round2);

        let returns = RETURN_PERIODS
            .iter()
            .map(|(label, offset)| {
                let value = round2(period_return(closes, *offset));
                SummaryEntry::new(label, Some(value), Some(returns_signal(value))).percent()
            })
            .collect();

        let ema20 = frame.latest(columns::EMA_20)?.map(round2);
        let ema200 = frame.latest(columns::EMA_200)?.map(round2);
        let rsi = frame.latest(columns::RSI_14)?.map(round2);

        let ema_marker = |ema: Option<Decimal>| match (ltp, ema) {
            (Some(ltp), Some(ema)) => ema_signal(ltp, ema),
            _ => Signal::Negative,
        };

        let momentum = vec![
            SummaryEntry::new("LTP", ltp, None),
            SummaryEntry::new("EMA20", ema20, Some(ema_marker(ema20))),
            SummaryEntry::new("EMA200", ema200, Some(ema_marker(ema200))),
            SummaryEntry::new(
                "RSI",
                rsi,
                Some(rsi.map(rsi_signal).unwrap_or(Signal::Negative)),
            ),
        ];

        let adx = frame.latest(columns::ADX_14)?.map(round2);
        let trend_strength = vec![
            SummaryEntry::new(
                "ADX",
                adx,
                Some(adx.map(adx_signal).unwrap_or(Signal::Negative)),
            ),
            SummaryEntry::new("DMP", frame.latest(columns::DMP_14)?.map(round2), None),
            SummaryEntry::new("DMN", frame.latest(columns::DMN_14)?.map(round2), None),
        ];

        Ok(Self {
            symbol: frame.symbol().to_string(),
            returns,
            momentum,
            trend_strength,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            ("Returns", &self.returns),
            ("Momentum", &self.momentum),
            ("Trend Strength", &self.trend_strength),
        ];
        for (i, (title, entries)) in sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", title)?;
            for entry in entries.iter() {
                writeln!(f, "- {}", entry)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorEngine;
    use chrono::{TimeZone, Utc};
    use dash_core::{Kline, Timeframe};

    #[test]
    fn test_returns_signal_boundaries() {
        assert_eq!(returns_signal(dec!(0)), Signal::Positive);
        assert_eq!(returns_signal(dec!(0.01)), Signal::Positive);
        assert_eq!(returns_signal(dec!(-0.01)), Signal::Negative);
    }

    #[test]
    fn test_ema_signal_boundaries() {
        assert_eq!(ema_signal(dec!(100), dec!(100)), Signal::Positive);
        assert_eq!(ema_signal(dec!(100), dec!(101)), Signal::Negative);
        assert_eq!(ema_signal(dec!(101), dec!(100)), Signal::Positive);
    }

    #[test]
    fn test_rsi_signal_is_exclusive() {
        assert_eq!(rsi_signal(dec!(50)), Signal::Positive);
        for value in [dec!(30), dec!(70), dec!(29), dec!(71)] {
            assert_eq!(rsi_signal(value), Signal::Negative, "rsi {}", value);
        }
    }

    #[test]
    fn test_adx_signal_threshold() {
        assert_eq!(adx_signal(dec!(25)), Signal::Negative);
        assert_eq!(adx_signal(dec!(25.0001)), Signal::Positive);
    }

    #[test]
    fn test_short_history_falls_back_to_latest() {
        let closes: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        assert_eq!(period_return(&closes, 20), Decimal::ZERO);
        assert_eq!(period_return(&closes, 10), Decimal::ZERO);
        // 10 → 5 행 전은 5: (10 - 5) / 5 × 100
        assert_eq!(period_return(&closes, 5), dec!(100));
    }

    #[test]
    fn test_rounding_before_marker() {
        // -0.004는 반올림하면 0 → 긍정
        let value = round2(dec!(-0.004));
        assert!(value.is_zero());
        assert_eq!(returns_signal(value), Signal::Positive);
        assert_eq!(round2(dec!(1.005)), dec!(1.00));
        assert_eq!(round2(dec!(1.015)), dec!(1.02));
    }

    #[test]
    fn test_rounded_values_keep_two_decimals() {
        assert_eq!(round2(dec!(100)).to_string(), "100.00");
        assert_eq!(round2(dec!(-0.004)).to_string(), "0.00");
        assert_eq!(round2(dec!(12.5)).to_string(), "12.50");

        let entry = SummaryEntry::new("DMP", Some(round2(dec!(100))), None);
        assert_eq!(entry.to_string(), "DMP : 100.00");
    }

    fn frame_of(len: usize) -> MarketFrame {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let klines: Vec<Kline> = (0..len)
            .map(|i| {
                let c = Decimal::from(100 + i as i64);
                Kline::new(
                    "ETHUSDT",
                    Timeframe::D1,
                    start + chrono::Duration::days(i as i64),
                    c,
                    c + dec!(2),
                    c - dec!(2),
                    c,
                    dec!(1),
                )
            })
            .collect();
        MarketFrame::from_klines("ETHUSDT", Timeframe::D1, &klines)
            .unwrap()
            .with_standard_indicators(&IndicatorEngine::new())
    }

    #[test]
    fn test_summary_on_ten_rows() {
        let summary = Summary::from_frame(&frame_of(10)).unwrap();

        assert_eq!(summary.returns.len(), 4);
        for entry in &summary.returns {
            assert_eq!(entry.value, Some(Decimal::ZERO));
            assert_eq!(entry.signal, Some(Signal::Positive));
        }
        assert_eq!(summary.momentum[0].value, Some(dec!(109)));
        // EMA20이 없으면 N/A + 부정 마커
        assert_eq!(summary.momentum[1].value, None);
        assert_eq!(summary.momentum[1].signal, Some(Signal::Negative));
        assert_eq!(summary.momentum[1].to_string(), "EMA20 : N/A 🔴");
    }

    #[test]
    fn test_summary_on_uptrend() {
        let summary = Summary::from_frame(&frame_of(80)).unwrap();

        // 최근가 179, 20행 전 159
        let one_month = &summary.returns[0];
        assert_eq!(one_month.value, Some(round2(dec!(20) / dec!(159) * dec!(100))));
        assert_eq!(one_month.to_string(), "1 MONTH : 12.58% ✅");

        assert_eq!(summary.momentum[1].signal, Some(Signal::Positive));
        assert_eq!(summary.momentum[3].signal, Some(Signal::Negative));
        assert_eq!(summary.trend_strength[0].signal, Some(Signal::Positive));

        let text = summary.to_string();
        assert!(text.starts_with("Returns\n- 1 MONTH"));
        assert!(text.contains("Trend Strength\n- ADX"));
    }
}
