//! 가격/거래량 차트 모델.
//!
//! 선택된 범위의 테이블을 그리기용 `f64` 좌표로 변환합니다.
//! x 좌표는 범위 안의 행 위치(0부터)입니다.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use dash_core::{ChartType, Timeframe};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::DataResult;
use crate::frame::{columns, MarketFrame};

/// 차트 범위 선택 버튼.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeSelector {
    /// 최근 1개월
    OneMonth,
    /// 최근 6개월
    SixMonths,
    /// 올해 1월 1일부터
    YearToDate,
    /// 최근 1년
    OneYear,
    /// 전체
    #[default]
    All,
}

impl RangeSelector {
    pub const ALL: [RangeSelector; 5] = [
        RangeSelector::OneMonth,
        RangeSelector::SixMonths,
        RangeSelector::YearToDate,
        RangeSelector::OneYear,
        RangeSelector::All,
    ];

    /// 버튼 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            RangeSelector::OneMonth => "1m",
            RangeSelector::SixMonths => "6m",
            RangeSelector::YearToDate => "YTD",
            RangeSelector::OneYear => "1y",
            RangeSelector::All => "all",
        }
    }

    /// 최신 봉 시간 기준 범위 시작 시각. `All`은 None.
    pub fn cutoff(&self, latest: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RangeSelector::OneMonth => latest.checked_sub_months(Months::new(1)),
            RangeSelector::SixMonths => latest.checked_sub_months(Months::new(6)),
            RangeSelector::OneYear => latest.checked_sub_months(Months::new(12)),
            RangeSelector::YearToDate => Utc.with_ymd_and_hms(latest.year(), 1, 1, 0, 0, 0).single(),
            RangeSelector::All => None,
        }
    }

    /// 범위에 포함되는 첫 행 인덱스.
    pub fn start_index(&self, times: &[DateTime<Utc>]) -> usize {
        match times.last().and_then(|latest| self.cutoff(*latest)) {
            Some(cutoff) => times.partition_point(|t| *t < cutoff),
            None => 0,
        }
    }
}

/// 그리기용 캔들.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandlePoint {
    pub x: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl CandlePoint {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// 가격 차트와 거래량 차트의 데이터.
#[derive(Debug, Clone)]
pub struct ChartModel {
    /// `"{SYMBOL} {Candlestick|Line} Chart"`
    pub title: String,
    pub chart_type: ChartType,
    pub range: RangeSelector,
    pub timeframe: Timeframe,
    /// 범위 안의 봉 시간
    pub times: Vec<DateTime<Utc>>,
    pub candles: Vec<CandlePoint>,
    /// 종가 선 (x, close)
    pub close_line: Vec<(f64, f64)>,
    /// EMA20 오버레이 (값이 있는 점만)
    pub ema20: Vec<(f64, f64)>,
    /// EMA200 오버레이 (값이 있는 점만)
    pub ema200: Vec<(f64, f64)>,
    /// 거래량 (x, volume)
    pub volume: Vec<(f64, f64)>,
    /// 가격 축 범위 (여백 포함)
    pub price_bounds: [f64; 2],
    /// 거래량 축 최대값
    pub volume_max: f64,
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

impl ChartModel {
    /// 테이블과 범위로 차트 모델을 만듭니다.
    ///
    /// # Errors
    /// EMA 열이 없으면 `DataError::UnknownColumn`을 반환합니다.
    pub fn build(frame: &MarketFrame, chart_type: ChartType, range: RangeSelector) -> DataResult<Self> {
        let start = range.start_index(frame.times());
        let ema20_col = frame.column(columns::EMA_20)?;
        let ema200_col = frame.column(columns::EMA_200)?;

        let mut candles = Vec::new();
        let mut close_line = Vec::new();
        let mut ema20 = Vec::new();
        let mut ema200 = Vec::new();
        let mut volume = Vec::new();

        for (pos, i) in (start..frame.len()).enumerate() {
            let x = pos as f64;
            let candle = CandlePoint {
                x,
                open: to_f64(frame.open()[i]),
                high: to_f64(frame.high()[i]),
                low: to_f64(frame.low()[i]),
                close: to_f64(frame.close()[i]),
            };
            close_line.push((x, candle.close));
            candles.push(candle);
            if let Some(v) = ema20_col[i] {
                ema20.push((x, to_f64(v)));
            }
            if let Some(v) = ema200_col[i] {
                ema200.push((x, to_f64(v)));
            }
            volume.push((x, to_f64(frame.volume()[i])));
        }

        let price_bounds = Self::price_bounds(chart_type, &candles, &ema20, &ema200);
        let volume_max = volume.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

        Ok(Self {
            title: format!("{} {} Chart", frame.symbol(), chart_type),
            chart_type,
            range,
            timeframe: frame.timeframe(),
            times: frame.times()[start..].to_vec(),
            candles,
            close_line,
            ema20,
            ema200,
            volume,
            price_bounds,
            volume_max,
        })
    }

    fn price_bounds(
        chart_type: ChartType,
        candles: &[CandlePoint],
        ema20: &[(f64, f64)],
        ema200: &[(f64, f64)],
    ) -> [f64; 2] {
        let prices = candles.iter().flat_map(|c| match chart_type {
            ChartType::Candlestick => [c.low, c.high],
            ChartType::Line => [c.close, c.close],
        });
        let overlays = ema20.iter().chain(ema200).map(|(_, y)| *y);

        let (min, max) = prices
            .chain(overlays)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        if !min.is_finite() || !max.is_finite() {
            return [0.0, 1.0];
        }
        let pad = if max > min { (max - min) * 0.05 } else { max.abs().max(1.0) * 0.01 };
        [min - pad, max + pad]
    }

    /// 범위 안의 봉 수.
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// x 축 라벨 (처음, 가운데, 마지막).
    pub fn time_labels(&self) -> Vec<String> {
        let fmt = if self.timeframe.duration() < chrono::Duration::days(1) {
            "%m-%d %H:%M"
        } else {
            "%Y-%m-%d"
        };
        match self.times.len() {
            0 => Vec::new(),
            1 => vec![self.times[0].format(fmt).to_string()],
            n => [0, n / 2, n - 1]
                .iter()
                .map(|i| self.times[*i].format(fmt).to_string())
                .collect(),
        }
    }
}
