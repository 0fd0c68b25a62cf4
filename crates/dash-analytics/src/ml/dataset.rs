//! 특성/라벨 테이블.
//!
//! 각 행은 가격/거래량/지표 특성 벡터와 다음 봉 종가가 더 높은지 여부(1/0)
//! 라벨로 구성됩니다. 결측값은 `NaN`으로 표현합니다.

use chrono::{DateTime, Utc};
use ndarray::{s, Array1, Array2};
use rust_decimal::prelude::ToPrimitive;

use super::error::MlResult;
use crate::frame::{columns, MarketFrame};
use crate::indicators::{AtrParams, IndicatorEngine, RsiParams, SmaParams};

/// 모델 입력 특성 (순서 고정).
pub const FEATURE_COLUMNS: [&str; 12] = [
    columns::OPEN,
    columns::HIGH,
    columns::LOW,
    columns::CLOSE,
    columns::VOLUME,
    columns::EMA_20,
    columns::EMA_200,
    columns::RSI_14,
    "SMA_10",
    "SMA_30",
    "RSI",
    "ATR",
];

/// 특성 행렬과 라벨.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    /// 특성 이름 (열 순서)
    pub names: Vec<String>,
    /// 행별 봉 시간
    pub times: Vec<DateTime<Utc>>,
    /// 특성 행렬 (행 × 특성, 결측은 NaN)
    pub features: Array2<f64>,
    /// 다음 봉 상승 여부 (1 = 상승)
    pub labels: Array1<u8>,
}

impl FeatureTable {
    /// 지표가 추가된 테이블에서 특성을 만듭니다.
    ///
    /// 원본 테이블은 변경하지 않고, SMA 10/30과 14기간 RSI/ATR을
    /// 복사본에 추가로 계산합니다.
    pub fn from_frame(frame: &MarketFrame, engine: &IndicatorEngine) -> MlResult<Self> {
        let mut work = frame.clone();
        let close = frame.close();

        work.append_single("SMA_10", engine.sma(close, SmaParams { period: 10 }));
        work.append_single("SMA_30", engine.sma(close, SmaParams { period: 30 }));
        work.append_single("RSI", engine.rsi(close, RsiParams { period: 14 }));
        work.append_single(
            "ATR",
            engine.atr(frame.high(), frame.low(), close, AtrParams { period: 14 }),
        );

        let rows = work.len();
        let mut features = Array2::<f64>::from_elem((rows, FEATURE_COLUMNS.len()), f64::NAN);
        for (j, name) in FEATURE_COLUMNS.iter().enumerate() {
            let series = work.series(name)?;
            for (i, value) in series.into_iter().enumerate() {
                if let Some(v) = value.and_then(|d| d.to_f64()) {
                    features[[i, j]] = v;
                }
            }
        }

        // 마지막 행은 다음 봉이 없으므로 0
        let labels = Array1::from_iter((0..rows).map(|i| {
            match close.get(i + 1) {
                Some(next) if *next > close[i] => 1u8,
                _ => 0u8,
            }
        }));

        Ok(Self {
            names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            times: work.times().to_vec(),
            features,
            labels,
        })
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 최근 `n`행만 남깁니다.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            names: self.names.clone(),
            times: self.times[start..].to_vec(),
            features: self.features.slice(s![start.., ..]).to_owned(),
            labels: self.labels.slice(s![start..]).to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dash_core::{Kline, Timeframe};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn frame(closes: &[i64]) -> MarketFrame {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let klines: Vec<Kline> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let c = Decimal::from(*c);
                Kline::new(
                    "BTCUSDT",
                    Timeframe::D1,
                    start + chrono::Duration::days(i as i64),
                    c,
                    c + dec!(1),
                    c - dec!(1),
                    c,
                    dec!(3),
                )
            })
            .collect();
        MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &klines)
            .unwrap()
            .with_standard_indicators(&IndicatorEngine::new())
    }

    #[test]
    fn test_labels_compare_next_close() {
        let table = FeatureTable::from_frame(&frame(&[1, 2, 2, 1, 5]), &IndicatorEngine::new()).unwrap();
        assert_eq!(table.labels.to_vec(), vec![1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_feature_layout_and_missing_values() {
        let closes: Vec<i64> = (0..35).map(|i| 100 + i).collect();
        let table = FeatureTable::from_frame(&frame(&closes), &IndicatorEngine::new()).unwrap();

        assert_eq!(table.features.dim(), (35, 12));
        assert_eq!(table.names[9], "SMA_30");
        assert_eq!(table.features[[0, 3]], 100.0);
        assert_eq!(table.features[[0, 4]], 3.0);
        // EMA_200은 전부 결측
        assert!(table.features.column(6).iter().all(|v| v.is_nan()));
        // SMA_10은 인덱스 9부터
        assert!(table.features[[8, 8]].is_nan());
        assert_eq!(table.features[[9, 8]], 104.5);
        // RSI와 RSI_14는 같은 값
        assert_eq!(table.features[[20, 7]], table.features[[20, 10]]);
    }

    #[test]
    fn test_tail_keeps_latest_rows() {
        let closes: Vec<i64> = (0..10).collect();
        let table = FeatureTable::from_frame(&frame(&closes), &IndicatorEngine::new()).unwrap();
        let tail = table.tail(3);

        assert_eq!(tail.len(), 3);
        assert_eq!(tail.features[[0, 3]], 7.0);
        assert_eq!(tail.times[2], table.times[9]);
        assert_eq!(table.tail(100).len(), 10);
    }
}
