//! 시장 데이터 테이블.
//!
//! 캔들 목록을 시간 오름차순 OHLCV 열과 이름으로 조회 가능한 지표 열로
//! 보관합니다. 지표 열은 추가된 순서를 유지합니다.

use std::io::Write;

use chrono::{DateTime, Utc};
use dash_core::{Kline, Timeframe};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{DataError, DataResult};
use crate::indicators::{
    AdxParams, AtrParams, BollingerBandsParams, EmaParams, IndicatorEngine, IndicatorResult,
    MacdParams, RsiParams,
};

/// 컬럼 이름.
pub mod columns {
    pub const TIME: &str = "time";
    pub const OPEN: &str = "open";
    pub const HIGH: &str = "high";
    pub const LOW: &str = "low";
    pub const CLOSE: &str = "close";
    pub const VOLUME: &str = "volume";

    pub const EMA_20: &str = "EMA_20";
    pub const EMA_200: &str = "EMA_200";
    pub const RSI_14: &str = "RSI_14";
    pub const ADX_14: &str = "ADX_14";
    pub const DMP_14: &str = "DMP_14";
    pub const DMN_14: &str = "DMN_14";
    pub const ATRR_14: &str = "ATRr_14";
}

/// 이름이 붙은 지표 열.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// 컬럼 이름
    pub name: String,
    /// 행별 값 (워밍업 구간은 None)
    pub values: Vec<Option<Decimal>>,
}

/// OHLCV + 지표 테이블.
#[derive(Debug, Clone)]
pub struct MarketFrame {
    symbol: String,
    timeframe: Timeframe,
    times: Vec<DateTime<Utc>>,
    open: Vec<Decimal>,
    high: Vec<Decimal>,
    low: Vec<Decimal>,
    close: Vec<Decimal>,
    volume: Vec<Decimal>,
    indicators: Vec<Column>,
}

impl MarketFrame {
    /// 캔들 목록으로 테이블을 생성합니다.
    ///
    /// # Errors
    /// 캔들이 하나도 없으면 `DataError::Empty`를 반환합니다.
    pub fn from_klines(symbol: &str, timeframe: Timeframe, klines: &[Kline]) -> DataResult<Self> {
        if klines.is_empty() {
            return Err(DataError::Empty {
                symbol: symbol.to_string(),
                interval: timeframe.to_string(),
            });
        }

        let len = klines.len();
        let mut frame = Self {
            symbol: symbol.to_string(),
            timeframe,
            times: Vec::with_capacity(len),
            open: Vec::with_capacity(len),
            high: Vec::with_capacity(len),
            low: Vec::with_capacity(len),
            close: Vec::with_capacity(len),
            volume: Vec::with_capacity(len),
            indicators: Vec::new(),
        };

        for kline in klines {
            frame.times.push(kline.open_time);
            frame.open.push(kline.open);
            frame.high.push(kline.high);
            frame.low.push(kline.low);
            frame.close.push(kline.close);
            frame.volume.push(kline.volume);
        }

        Ok(frame)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn open(&self) -> &[Decimal] {
        &self.open
    }

    pub fn high(&self) -> &[Decimal] {
        &self.high
    }

    pub fn low(&self) -> &[Decimal] {
        &self.low
    }

    pub fn close(&self) -> &[Decimal] {
        &self.close
    }

    pub fn volume(&self) -> &[Decimal] {
        &self.volume
    }

    /// 가장 최근 봉의 시작 시간.
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.times.last().copied()
    }

    /// 지표 열 목록 (추가 순서).
    pub fn indicators(&self) -> &[Column] {
        &self.indicators
    }

    /// 전체 컬럼 이름 (`time`, OHLCV, 지표 순).
    pub fn column_names(&self) -> Vec<&str> {
        let mut names = vec![
            columns::TIME,
            columns::OPEN,
            columns::HIGH,
            columns::LOW,
            columns::CLOSE,
            columns::VOLUME,
        ];
        names.extend(self.indicators.iter().map(|c| c.name.as_str()));
        names
    }

    /// 지표 열을 추가합니다. 같은 이름이 있으면 교체합니다.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<Decimal>>) -> DataResult<()> {
        let name = name.into();
        if values.len() != self.len() {
            return Err(DataError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.insert_column(name, values);
        Ok(())
    }

    fn insert_column(&mut self, name: String, values: Vec<Option<Decimal>>) {
        match self.indicators.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.indicators.push(Column { name, values }),
        }
    }

    /// 지표 열 조회.
    pub fn column(&self, name: &str) -> DataResult<&[Option<Decimal>]> {
        self.indicators
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    }

    /// OHLCV와 지표를 구분하지 않고 열 값을 반환합니다.
    pub fn series(&self, name: &str) -> DataResult<Vec<Option<Decimal>>> {
        let base = match name {
            columns::OPEN => Some(&self.open),
            columns::HIGH => Some(&self.high),
            columns::LOW => Some(&self.low),
            columns::CLOSE => Some(&self.close),
            columns::VOLUME => Some(&self.volume),
            _ => None,
        };
        match base {
            Some(values) => Ok(values.iter().copied().map(Some).collect()),
            None => self.column(name).map(|values| values.to_vec()),
        }
    }

    /// 마지막 행의 지표 값.
    pub fn latest(&self, name: &str) -> DataResult<Option<Decimal>> {
        Ok(self.column(name)?.last().copied().flatten())
    }

    /// 한 행의 값 (`time` 제외, `column_names` 순서).
    pub fn row_values(&self, row: usize) -> Vec<Option<Decimal>> {
        let mut values = vec![
            self.open.get(row).copied(),
            self.high.get(row).copied(),
            self.low.get(row).copied(),
            self.close.get(row).copied(),
            self.volume.get(row).copied(),
        ];
        values.extend(self.indicators.iter().map(|c| c.values.get(row).copied().flatten()));
        values
    }

    /// 최신 행부터의 행 인덱스.
    pub fn rows_newest_first(&self) -> impl Iterator<Item = usize> {
        (0..self.len()).rev()
    }

    /// 표준 지표 세트를 추가합니다.
    ///
    /// EMA 20/200, RSI 14, ADX 14, ATR 14, 볼린저 밴드 (14, 2.0),
    /// MACD (12, 26, 9). 데이터가 기간보다 짧은 지표는 전부 None인 열이 됩니다.
    pub fn with_standard_indicators(mut self, engine: &IndicatorEngine) -> Self {
        let close = self.close.clone();

        for period in [20, 200] {
            let ema = engine.ema(&close, EmaParams { period });
            self.append_single(&format!("EMA_{}", period), ema);
        }

        self.append_single(columns::RSI_14, engine.rsi(&close, RsiParams { period: 14 }));

        let adx: IndicatorResult<Vec<Vec<Option<Decimal>>>> = engine
            .adx(&self.high, &self.low, &self.close, AdxParams { period: 14 })
            .map(|rows| {
                vec![
                    rows.iter().map(|r| r.adx).collect(),
                    rows.iter().map(|r| r.plus_di).collect(),
                    rows.iter().map(|r| r.minus_di).collect(),
                ]
            });
        self.append_group(&[columns::ADX_14, columns::DMP_14, columns::DMN_14], adx);

        let atr = engine.atr(&self.high, &self.low, &self.close, AtrParams { period: 14 });
        self.append_single(columns::ATRR_14, atr);

        let bb_params = BollingerBandsParams::default();
        let suffix = bb_params.suffix();
        let bands: IndicatorResult<Vec<Vec<Option<Decimal>>>> =
            engine.bollinger_bands(&close, bb_params).map(|rows| {
                vec![
                    rows.iter().map(|r| r.lower).collect(),
                    rows.iter().map(|r| r.middle).collect(),
                    rows.iter().map(|r| r.upper).collect(),
                    rows.iter().map(|r| r.bandwidth).collect(),
                    rows.iter().map(|r| r.percent_b).collect(),
                ]
            });
        let names = ["BBL", "BBM", "BBU", "BBB", "BBP"].map(|p| format!("{}_{}", p, suffix));
        self.append_group(&names.each_ref().map(String::as_str), bands);

        let macd_params = MacdParams::default();
        let suffix = macd_params.suffix();
        let macd: IndicatorResult<Vec<Vec<Option<Decimal>>>> =
            engine.macd(&close, macd_params).map(|rows| {
                vec![
                    rows.iter().map(|r| r.macd).collect(),
                    rows.iter().map(|r| r.histogram).collect(),
                    rows.iter().map(|r| r.signal).collect(),
                ]
            });
        let names = ["MACD", "MACDh", "MACDs"].map(|p| format!("{}_{}", p, suffix));
        self.append_group(&names.each_ref().map(String::as_str), macd);

        debug!(
            symbol = %self.symbol,
            rows = self.len(),
            columns = self.indicators.len(),
            "Indicators appended"
        );
        self
    }

    /// 단일 출력 지표를 추가합니다. 계산 실패 시 빈 열을 추가합니다.
    pub(crate) fn append_single(&mut self, name: &str, result: IndicatorResult<Vec<Option<Decimal>>>) {
        let values = match result {
            Ok(values) => values,
            Err(e) => {
                warn!(column = name, rows = self.len(), "{}", e);
                vec![None; self.len()]
            }
        };
        self.insert_column(name.to_string(), values);
    }

    /// 여러 출력 지표를 이름 순서대로 추가합니다.
    fn append_group(&mut self, names: &[&str], result: IndicatorResult<Vec<Vec<Option<Decimal>>>>) {
        match result {
            Ok(groups) => {
                for (name, values) in names.iter().zip(groups) {
                    self.insert_column(name.to_string(), values);
                }
            }
            Err(e) => {
                warn!(columns = ?names, rows = self.len(), "{}", e);
                for name in names {
                    self.insert_column(name.to_string(), vec![None; self.len()]);
                }
            }
        }
    }

    /// 최신 행부터 CSV로 출력합니다.
    pub fn write_csv<W: Write>(&self, writer: W) -> DataResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.column_names())?;

        for row in self.rows_newest_first() {
            let mut record = vec![self.times[row].format("%Y-%m-%d %H:%M:%S").to_string()];
            record.extend(
                self.row_values(row)
                    .into_iter()
                    .map(|v| v.map(|d| d.normalize().to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn klines(closes: &[i64]) -> Vec<Kline> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
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
                    dec!(10),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_klines_rejected() {
        let err = MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &[]).unwrap_err();
        assert!(matches!(err, DataError::Empty { .. }));
    }

    #[test]
    fn test_standard_indicator_column_order() {
        let closes: Vec<i64> = (0..60).map(|i| 100 + i).collect();
        let frame = MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &klines(&closes))
            .unwrap()
            .with_standard_indicators(&IndicatorEngine::new());

        let names = frame.column_names();
        assert_eq!(
            names,
            vec![
                "time", "open", "high", "low", "close", "volume", "EMA_20", "EMA_200", "RSI_14",
                "ADX_14", "DMP_14", "DMN_14", "ATRr_14", "BBL_14_2.0", "BBM_14_2.0", "BBU_14_2.0",
                "BBB_14_2.0", "BBP_14_2.0", "MACD_12_26_9", "MACDh_12_26_9", "MACDs_12_26_9",
            ]
        );
    }

    #[test]
    fn test_short_history_yields_missing_columns() {
        let closes: Vec<i64> = (0..30).map(|i| 100 + i).collect();
        let frame = MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &klines(&closes))
            .unwrap()
            .with_standard_indicators(&IndicatorEngine::new());

        let ema200 = frame.column(columns::EMA_200).unwrap();
        assert_eq!(ema200.len(), 30);
        assert!(ema200.iter().all(Option::is_none));
        assert!(frame.latest(columns::EMA_20).unwrap().is_some());
        assert!(frame.latest("MACDs_12_26_9").unwrap().is_none());
    }

    #[test]
    fn test_series_covers_base_and_indicator_columns() {
        let mut frame = MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &klines(&[1, 2, 3])).unwrap();
        frame.push_column("X", vec![None, Some(dec!(1)), Some(dec!(2))]).unwrap();

        assert_eq!(frame.series("close").unwrap()[2], Some(dec!(3)));
        assert_eq!(frame.series("X").unwrap()[0], None);
        assert!(matches!(frame.series("nope"), Err(DataError::UnknownColumn(_))));
        assert!(matches!(
            frame.push_column("Y", vec![None]),
            Err(DataError::LengthMismatch { expected: 3, actual: 1, .. })
        ));
    }

    #[test]
    fn test_csv_is_newest_first() {
        let mut frame = MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &klines(&[1, 2])).unwrap();
        frame.push_column("X", vec![None, Some(dec!(0.50))]).unwrap();

        let mut buf = Vec::new();
        frame.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "time,open,high,low,close,volume,X");
        assert_eq!(lines[1], "2024-01-02 00:00:00,2,3,1,2,10,0.5");
        assert_eq!(lines[2], "2024-01-01 00:00:00,1,2,0,1,10,");
    }

    #[test]
    fn test_csv_quotes_column_names_with_commas() {
        let mut frame = MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &klines(&[1])).unwrap();
        frame.push_column("BB_14,2", vec![Some(dec!(1))]).unwrap();

        let mut buf = Vec::new();
        frame.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.lines().next(), Some("time,open,high,low,close,volume,\"BB_14,2\""));
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        assert_eq!(reader.headers().unwrap().len(), 7);
        assert_eq!(reader.records().count(), 1);
    }
}
