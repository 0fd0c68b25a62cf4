//! 추세 강도 지표.
//!
//! ADX (Average Directional Index)와 방향성 지표 +DI(DMP), -DI(DMN).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_ohlc_lengths, ensure_period, wilder_next, IndicatorResult};

/// ADX 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdxParams {
    /// 평활 기간 (기본: 14).
    pub period: usize,
}

impl Default for AdxParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 한 시점의 ADX 값.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AdxResult {
    /// ADX (0-100).
    pub adx: Option<Decimal>,
    /// +DI (DMP).
    pub plus_di: Option<Decimal>,
    /// -DI (DMN).
    pub minus_di: Option<Decimal>,
}

/// 추세 강도 계산기.
#[derive(Debug, Default)]
pub struct StrengthIndicators;

impl StrengthIndicators {
    /// 새로운 추세 강도 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// ADX 계산.
    ///
    /// 1. 봉마다 +DM, -DM, TR 계산 (인덱스 1부터)
    /// 2. 처음 `period`개 평균으로 시작해 Wilder 평활
    /// 3. +DI = 100 × 평활 +DM / 평활 TR, -DI도 동일 (인덱스 `period`부터)
    /// 4. DX = 100 × |+DI - -DI| / (+DI + -DI)
    /// 5. ADX = DX의 Wilder 평활 (인덱스 `2 × period - 1`부터)
    pub fn adx(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AdxParams,
    ) -> IndicatorResult<Vec<AdxResult>> {
        let period = params.period;
        ensure_ohlc_lengths(high, low, close)?;
        ensure_period(period, 2 * period, high.len())?;

        let len = high.len();
        let mut plus_dm = Vec::with_capacity(len - 1);
        let mut minus_dm = Vec::with_capacity(len - 1);
        let mut tr = Vec::with_capacity(len - 1);

        for i in 1..len {
            let up = high[i] - high[i - 1];
            let down = low[i - 1] - low[i];
            plus_dm.push(if up > down && up > Decimal::ZERO { up } else { Decimal::ZERO });
            minus_dm.push(if down > up && down > Decimal::ZERO { down } else { Decimal::ZERO });

            let prev_close = close[i - 1];
            tr.push(
                (high[i] - low[i])
                    .max((high[i] - prev_close).abs())
                    .max((low[i] - prev_close).abs()),
            );
        }

        let n = Decimal::from(period);
        let mut sm_plus = plus_dm[..period].iter().sum::<Decimal>() / n;
        let mut sm_minus = minus_dm[..period].iter().sum::<Decimal>() / n;
        let mut sm_tr = tr[..period].iter().sum::<Decimal>() / n;

        let mut result = vec![AdxResult::default(); len];
        let mut dx_values = Vec::with_capacity(len - period);

        // 변화 인덱스 j는 원본 인덱스 j + 1에 대응
        for j in (period - 1)..tr.len() {
            if j >= period {
                sm_plus = wilder_next(sm_plus, plus_dm[j], period);
                sm_minus = wilder_next(sm_minus, minus_dm[j], period);
                sm_tr = wilder_next(sm_tr, tr[j], period);
            }

            let (plus_di, minus_di) = if sm_tr.is_zero() {
                (Decimal::ZERO, Decimal::ZERO)
            } else {
                (dec!(100) * sm_plus / sm_tr, dec!(100) * sm_minus / sm_tr)
            };
            let di_sum = plus_di + minus_di;
            let dx = if di_sum.is_zero() {
                Decimal::ZERO
            } else {
                dec!(100) * (plus_di - minus_di).abs() / di_sum
            };
            dx_values.push(dx);

            let row = &mut result[j + 1];
            row.plus_di = Some(plus_di);
            row.minus_di = Some(minus_di);
        }

        // dx_values[0]은 원본 인덱스 period에 대응
        let mut adx = dx_values[..period].iter().sum::<Decimal>() / n;
        result[2 * period - 1].adx = Some(adx);
        for (k, dx) in dx_values.iter().enumerate().skip(period) {
            adx = wilder_next(adx, *dx, period);
            result[period + k].adx = Some(adx);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorError;

    fn trending_up(len: usize) -> (Vec<Decimal>, Vec<Decimal>, Vec<Decimal>) {
        let close: Vec<Decimal> = (0..len).map(|i| Decimal::from(100 + 2 * i as i64)).collect();
        let high = close.iter().map(|c| *c + dec!(1)).collect();
        let low = close.iter().map(|c| *c - dec!(1)).collect();
        (high, low, close)
    }

    #[test]
    fn test_adx_warmup_positions() {
        let strength = StrengthIndicators::new();
        let (high, low, close) = trending_up(40);
        let result = strength.adx(&high, &low, &close, AdxParams::default()).unwrap();

        assert_eq!(result.len(), 40);
        assert!(result[13].plus_di.is_none());
        assert!(result[14].plus_di.is_some());
        assert!(result[26].adx.is_none());
        assert!(result[27].adx.is_some());
        assert!(result[39].adx.is_some());
    }

    #[test]
    fn test_strong_uptrend() {
        let strength = StrengthIndicators::new();
        let (high, low, close) = trending_up(40);
        let result = strength.adx(&high, &low, &close, AdxParams::default()).unwrap();
        let last = result[39];

        assert_eq!(last.minus_di, Some(Decimal::ZERO));
        assert!(last.plus_di.unwrap() > dec!(50));
        // 한 방향으로만 움직이면 DX = 100
        assert!((last.adx.unwrap() - dec!(100)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_flat_market_has_zero_adx() {
        let strength = StrengthIndicators::new();
        let flat = vec![dec!(10); 30];
        let result = strength.adx(&flat, &flat, &flat, AdxParams::default()).unwrap();
        assert_eq!(result[29].adx, Some(Decimal::ZERO));
        assert_eq!(result[29].plus_di, Some(Decimal::ZERO));
    }

    #[test]
    fn test_adx_requires_two_periods() {
        let strength = StrengthIndicators::new();
        let (high, low, close) = trending_up(27);
        let err = strength
            .adx(&high, &low, &close, AdxParams::default())
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InsufficientData { required: 28, .. }));
    }
}
