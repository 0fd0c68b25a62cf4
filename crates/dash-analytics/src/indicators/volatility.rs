//! 변동성 지표.
//!
//! - ATR (Average True Range, Wilder 평활)
//! - Bollinger Bands (모표준편차 기반, 밴드폭과 %B 포함)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_ohlc_lengths, ensure_period, wilder_next, IndicatorError, IndicatorResult};

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간.
    pub period: usize,
    /// 표준편차 배수.
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 14,
            std_dev_multiplier: dec!(2.0),
        }
    }
}

impl BollingerBandsParams {
    /// 컬럼 이름 접미사 (예: `14_2.0`).
    pub fn suffix(&self) -> String {
        format!("{}_{:.1}", self.period, self.std_dev_multiplier)
    }
}

/// 한 시점의 볼린저 밴드 값.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 하단 밴드.
    pub lower: Option<Decimal>,
    /// 중간 밴드 (SMA).
    pub middle: Option<Decimal>,
    /// 상단 밴드.
    pub upper: Option<Decimal>,
    /// 밴드폭 (%) = (상단 - 하단) / 중간 × 100.
    pub bandwidth: Option<Decimal>,
    /// %B = (종가 - 하단) / (상단 - 하단).
    pub percent_b: Option<Decimal>,
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// True Range 계산.
    ///
    /// 첫 봉은 이전 종가가 없으므로 `고가 - 저가`입니다.
    pub fn true_range(&self, high: &[Decimal], low: &[Decimal], close: &[Decimal]) -> IndicatorResult<Vec<Decimal>> {
        ensure_ohlc_lengths(high, low, close)?;

        let result = (0..high.len())
            .map(|i| {
                let range = high[i] - low[i];
                if i == 0 {
                    return range;
                }
                let prev_close = close[i - 1];
                range
                    .max((high[i] - prev_close).abs())
                    .max((low[i] - prev_close).abs())
            })
            .collect();

        Ok(result)
    }

    /// ATR 계산.
    ///
    /// 첫 값(인덱스 `period - 1`)은 처음 `period`개 TR의 평균이고,
    /// 이후 Wilder 평활을 적용합니다.
    pub fn atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        ensure_period(period, period, high.len())?;
        let tr = self.true_range(high, low, close)?;

        let mut result = vec![None; period - 1];
        let mut atr = tr[..period].iter().sum::<Decimal>() / Decimal::from(period);
        result.push(Some(atr));

        for value in &tr[period..] {
            atr = wilder_next(atr, *value, period);
            result.push(Some(atr));
        }

        Ok(result)
    }

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let period = params.period;
        ensure_period(period, period, prices.len())?;
        if params.std_dev_multiplier <= Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter(
                "표준편차 배수는 0보다 커야 합니다".to_string(),
            ));
        }

        let n = Decimal::from(period);
        let mut result = vec![BollingerBandsResult::default(); prices.len()];

        for i in (period - 1)..prices.len() {
            let window = &prices[i + 1 - period..=i];
            let mean = window.iter().sum::<Decimal>() / n;
            let variance = window
                .iter()
                .map(|p| (*p - mean) * (*p - mean))
                .sum::<Decimal>()
                / n;
            let band = self.sqrt_decimal(variance) * params.std_dev_multiplier;

            let upper = mean + band;
            let lower = mean - band;
            let width = upper - lower;

            let bandwidth = if mean.is_zero() {
                None
            } else {
                Some(width / mean * dec!(100))
            };
            let percent_b = if width.is_zero() {
                None
            } else {
                Some((prices[i] - lower) / width)
            };

            result[i] = BollingerBandsResult {
                lower: Some(lower),
                middle: Some(mean),
                upper: Some(upper),
                bandwidth,
                percent_b,
            };
        }

        Ok(result)
    }

    /// Decimal 제곱근 (Newton-Raphson).
    pub(crate) fn sqrt_decimal(&self, value: Decimal) -> Decimal {
        if value <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut guess = if value > Decimal::ONE { value / dec!(2) } else { Decimal::ONE };
        for _ in 0..32 {
            let next = (guess + value / guess) / dec!(2);
            if (next - guess).abs() < dec!(0.0000000001) {
                return next;
            }
            guess = next;
        }
        guess
    }
}
