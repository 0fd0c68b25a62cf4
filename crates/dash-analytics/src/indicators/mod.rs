//! 기술적 지표 모듈.
//!
//! 모든 지표는 `Decimal` 가격 시계열을 받아 입력과 같은 길이의 결과를
//! 반환합니다. 워밍업 구간은 `None`입니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표
//! - **SMA**, **EMA**, **MACD**
//!
//! ## 모멘텀 지표
//! - **RSI** (Wilder)
//!
//! ## 변동성 지표
//! - **ATR** (Wilder), **Bollinger Bands**
//!
//! ## 추세 강도
//! - **ADX**, +DI, -DI
//!
//! # 사용 예시
//!
//! ```ignore
//! use dash_analytics::indicators::{IndicatorEngine, EmaParams, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//! let ema = engine.ema(&closes, EmaParams { period: 20 })?;
//! let rsi = engine.rsi(&closes, RsiParams::default())?;
//! ```

pub mod momentum;
pub mod strength;
pub mod trend;
pub mod volatility;

use rust_decimal::Decimal;
use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams};
pub use strength::{AdxParams, AdxResult, StrengthIndicators};
pub use trend::{EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators};
pub use volatility::{AtrParams, BollingerBandsParams, BollingerBandsResult, VolatilityIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 기간이 0이 아니고 데이터가 `required`개 이상인지 확인.
pub(crate) fn ensure_period(period: usize, required: usize, provided: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    if provided < required {
        return Err(IndicatorError::InsufficientData { required, provided });
    }
    Ok(())
}

/// 고가/저가/종가 길이가 같은지 확인.
pub(crate) fn ensure_ohlc_lengths(high: &[Decimal], low: &[Decimal], close: &[Decimal]) -> IndicatorResult<()> {
    if high.len() != low.len() || high.len() != close.len() {
        return Err(IndicatorError::InvalidParameter(format!(
            "고가/저가/종가 길이가 다릅니다: {}/{}/{}",
            high.len(),
            low.len(),
            close.len()
        )));
    }
    Ok(())
}

/// Wilder 평활 한 단계: `(이전 × (n-1) + 현재) / n`.
pub(crate) fn wilder_next(prev: Decimal, current: Decimal, period: usize) -> Decimal {
    let n = Decimal::from(period);
    (prev * (n - Decimal::ONE) + current) / n
}

/// 통합 지표 엔진.
///
/// 모든 기술적 지표 계산을 위한 단일 진입점입니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    strength: StrengthIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균 (EMA) 계산.
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.ema(prices, params)
    }

    /// MACD 계산.
    ///
    /// # 반환
    /// MACD 라인, 시그널 라인, 히스토그램
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI 계산 (0-100).
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.rsi(prices, params)
    }

    // ==================== 변동성 지표 ====================

    /// ATR 계산.
    pub fn atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.volatility.atr(high, low, close, params)
    }

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        self.volatility.bollinger_bands(prices, params)
    }

    // ==================== 추세 강도 ====================

    /// ADX, +DI, -DI 계산.
    pub fn adx(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AdxParams,
    ) -> IndicatorResult<Vec<AdxResult>> {
        self.strength.adx(high, low, close, params)
    }
}
