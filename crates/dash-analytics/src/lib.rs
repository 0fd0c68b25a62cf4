//! # Dash Analytics
//!
//! 대시보드의 계산 계층입니다.
//!
//! - `indicators`: Decimal 기반 기술적 지표 (EMA, RSI, ADX, ATR, 볼린저, MACD)
//! - `frame`: OHLCV + 지표 테이블
//! - `summary`: 수익률/모멘텀/추세 강도 요약과 마커
//! - `chart`: 범위 선택이 적용된 차트 모델
//! - `ml`: 로지스틱 회귀 방향 예측 파이프라인

pub mod chart;
pub mod error;
pub mod frame;
pub mod indicators;
pub mod ml;
pub mod summary;

pub use chart::{CandlePoint, ChartModel, RangeSelector};
pub use error::{DataError, DataResult};
pub use frame::{columns, Column, MarketFrame};
pub use indicators::{IndicatorEngine, IndicatorError, IndicatorResult};
pub use ml::{DirectionPipeline, PipelineConfig, PredictionReport};
pub use summary::{Signal, Summary, SummaryEntry};
