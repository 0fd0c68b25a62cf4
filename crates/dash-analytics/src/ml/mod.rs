//! 다음 봉 가격 방향 예측.
//!
//! ```text
//! MarketFrame (지표 포함)
//!        │
//!        ▼
//! ┌─────────────────┐
//! │  FeatureTable   │ ← 특성 12개 + 상승 라벨
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │  MeanImputer    │ ← 결측 대치, 빈 열 제외
//! └────────┬────────┘
//!          ▼
//!   train_test_split (seed 고정)
//!          ▼
//! ┌─────────────────┐
//! │ StandardScaler  │ ← 학습 세트로 학습
//! └────────┬────────┘
//!          ▼
//! ┌────────────────────┐
//! │ LogisticRegression │ ← L2, C = 1.0
//! └────────┬───────────┘
//!          ▼
//!   ClassificationReport + Forecast
//! ```

pub mod dataset;
pub mod error;
pub mod logistic;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;

pub use dataset::{FeatureTable, FEATURE_COLUMNS};
pub use error::{MlError, MlResult};
pub use logistic::{LogisticParams, LogisticRegression};
pub use metrics::{accuracy, ClassMetrics, ClassificationReport};
pub use pipeline::{Direction, DirectionPipeline, Forecast, PipelineConfig, PredictionReport};
pub use preprocess::{train_test_split, MeanImputer, Split, StandardScaler};
