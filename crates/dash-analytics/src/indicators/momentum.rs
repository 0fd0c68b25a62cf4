//! 모멘텀 지표.
//!
//! 과매수/과매도 상태를 측정하는 RSI를 제공합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_period, wilder_next, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - 100 / (1 + 평균 상승폭 / 평균 하락폭)
    ///
    /// 첫 평균은 처음 `period`개 변화량의 단순 평균이고, 이후
    /// Wilder 평활 `(이전 × (n-1) + 현재) / n`을 적용합니다.
    /// 첫 RSI는 인덱스 `period`에 위치합니다.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        ensure_period(period, period + 1, prices.len())?;

        let (gains, losses): (Vec<Decimal>, Vec<Decimal>) = prices
            .windows(2)
            .map(|w| {
                let delta = w[1] - w[0];
                if delta > Decimal::ZERO {
                    (delta, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, -delta)
                }
            })
            .unzip();

        let n = Decimal::from(period);
        let mut avg_gain = gains[..period].iter().sum::<Decimal>() / n;
        let mut avg_loss = losses[..period].iter().sum::<Decimal>() / n;

        let mut result = vec![None; period];
        result.push(Some(Self::rsi_value(avg_gain, avg_loss)));

        for i in period..gains.len() {
            avg_gain = wilder_next(avg_gain, gains[i], period);
            avg_loss = wilder_next(avg_loss, losses[i], period);
            result.push(Some(Self::rsi_value(avg_gain, avg_loss)));
        }

        Ok(result)
    }

    fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
        if avg_loss.is_zero() {
            // 변화가 전혀 없으면 중립
            if avg_gain.is_zero() {
                return dec!(50);
            }
            return dec!(100);
        }
        let rs = avg_gain / avg_loss;
        dec!(100) - dec!(100) / (Decimal::ONE + rs)
    }
}
