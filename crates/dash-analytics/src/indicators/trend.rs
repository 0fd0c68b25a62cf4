//! 추세 지표.
//!
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 10 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdParams {
    /// 컬럼 이름 접미사 (예: `12_26_9`).
    pub fn suffix(&self) -> String {
        format!("{}_{}_{}", self.fast_period, self.slow_period, self.signal_period)
    }
}

/// 한 시점의 MACD 값.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<Decimal>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// 처음 `period - 1`개는 None입니다. 합계를 밀어 가며 계산합니다.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        ensure_period(period, period, prices.len())?;

        let divisor = Decimal::from(period);
        let mut result = vec![None; prices.len()];
        let mut window_sum: Decimal = prices[..period].iter().sum();
        result[period - 1] = Some(window_sum / divisor);

        for i in period..prices.len() {
            window_sum += prices[i] - prices[i - period];
            result[i] = Some(window_sum / divisor);
        }

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = 현재가 × k + 이전 EMA × (1 - k), k = 2 / (period + 1).
    /// 첫 값은 처음 `period`개의 SMA입니다.
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        ensure_period(period, period, prices.len())?;

        let mut result = vec![None; period - 1];
        result.extend(Self::ema_series(prices, period).into_iter().map(Some));
        Ok(result)
    }

    /// SMA로 시작하는 EMA 값들 (인덱스 `period - 1`부터).
    fn ema_series(values: &[Decimal], period: usize) -> Vec<Decimal> {
        let k = dec!(2) / Decimal::from(period + 1);
        let seed = values[..period].iter().sum::<Decimal>() / Decimal::from(period);

        let mut series = Vec::with_capacity(values.len() + 1 - period);
        series.push(seed);
        let mut prev = seed;
        for value in &values[period..] {
            prev = *value * k + prev * (Decimal::ONE - k);
            series.push(prev);
        }
        series
    }

    /// MACD 계산.
    ///
    /// 시그널 라인은 MACD 라인이 존재하는 구간에만 EMA를 적용합니다.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        if params.fast_period == 0 || params.signal_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if params.fast_period >= params.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "단기 기간({})은 장기 기간({})보다 작아야 합니다",
                params.fast_period, params.slow_period
            )));
        }

        let min_required = params.slow_period + params.signal_period - 1;
        ensure_period(params.slow_period, min_required, prices.len())?;

        let fast = Self::ema_series(prices, params.fast_period);
        let slow = Self::ema_series(prices, params.slow_period);

        // slow 시작 인덱스(slow_period - 1)에 맞춰 fast를 정렬
        let offset = params.slow_period - params.fast_period;
        let macd_line: Vec<Decimal> = slow
            .iter()
            .enumerate()
            .map(|(i, s)| fast[i + offset] - *s)
            .collect();
        let signal = Self::ema_series(&macd_line, params.signal_period);

        let macd_start = params.slow_period - 1;
        let signal_start = macd_start + params.signal_period - 1;

        let result = (0..prices.len())
            .map(|i| {
                let macd = i.checked_sub(macd_start).map(|j| macd_line[j]);
                let signal = i.checked_sub(signal_start).map(|j| signal[j]);
                let histogram = match (macd, signal) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                };
                MacdResult {
                    macd,
                    signal,
                    histogram,
                }
            })
            .collect();

        Ok(result)
    }
}
