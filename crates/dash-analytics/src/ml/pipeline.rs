//! 다음 봉 방향 예측 파이프라인.
//!
//! 특성 테이블 → 최근 윈도우 → 평균 대치 → 셔플 분할 → 표준화
//! → 로지스틱 회귀 → 테스트 평가 → 미래 봉 예측.
//!
//! 미래 예측은 마지막 관측 특성 행을 horizon만큼 반복해 입력하므로
//! 한 번 학습된 모델에서는 모든 예측이 같습니다.

use std::fmt;

use chrono::{DateTime, Utc};
use dash_core::MlConfig;
use ndarray::{Array2, Axis};
use serde::Serialize;
use tracing::info;

use super::dataset::FeatureTable;
use super::error::{MlError, MlResult};
use super::logistic::LogisticRegression;
use super::metrics::ClassificationReport;
use super::preprocess::{test_count, train_test_split, MeanImputer, StandardScaler};
use crate::frame::MarketFrame;
use crate::indicators::IndicatorEngine;

/// 분할마다 필요한 최소 행 수.
pub const MIN_ROWS_PER_SPLIT: usize = 2;

/// 예측 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// 차트용 값 (1: Up, 0: Down).
    pub fn as_value(self) -> u8 {
        match self {
            Direction::Up => 1,
            Direction::Down => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

/// 미래 봉 하나의 예측.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Forecast {
    pub time: DateTime<Utc>,
    pub direction: Direction,
    /// 상승 확률
    pub probability_up: f64,
}

/// 파이프라인 실행 결과.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    /// 학습 윈도우 행 수
    pub window_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// 사용된 특성 (전부 결측인 열 제외)
    pub features: Vec<String>,
    /// 제외된 특성
    pub dropped_features: Vec<String>,
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub forecasts: Vec<Forecast>,
}

/// 파이프라인 설정.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// 학습에 사용할 최근 행 수
    pub training_window: usize,
    /// 예측할 미래 봉 수
    pub horizon: usize,
    pub test_size: f64,
    pub seed: u64,
    /// 로지스틱 회귀 C
    pub regularization_c: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&MlConfig::default())
    }
}

impl From<&MlConfig> for PipelineConfig {
    fn from(config: &MlConfig) -> Self {
        Self {
            training_window: config.training_window,
            horizon: config.horizon,
            test_size: config.test_size,
            seed: config.seed,
            regularization_c: config.regularization_c,
        }
    }
}

/// 방향 예측 파이프라인.
#[derive(Debug, Clone)]
pub struct DirectionPipeline {
    config: PipelineConfig,
}

impl DirectionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// 두 분할 모두 최소 행 수를 만족하는 가장 작은 윈도우.
    pub fn min_rows(&self) -> usize {
        (2 * MIN_ROWS_PER_SPLIT..)
            .find(|n| {
                let n_test = test_count(*n, self.config.test_size);
                n_test >= MIN_ROWS_PER_SPLIT && n - n_test.min(*n) >= MIN_ROWS_PER_SPLIT
            })
            .unwrap_or(usize::MAX)
    }

    /// 파이프라인을 실행합니다.
    ///
    /// # Errors
    /// - 행 수가 부족하면 `MlError::InsufficientData`
    /// - 학습 라벨이 한 종류뿐이면 `MlError::SingleClass`
    pub fn run(&self, frame: &MarketFrame, engine: &IndicatorEngine) -> MlResult<PredictionReport> {
        let table = FeatureTable::from_frame(frame, engine)?;
        let window = table.tail(self.config.training_window);

        let required = self.min_rows();
        if window.len() < required {
            return Err(MlError::InsufficientData {
                required,
                actual: window.len(),
            });
        }

        let mut imputer = MeanImputer::new();
        let x = imputer.fit_transform(&window.features)?;
        let kept = imputer.kept_columns();
        let features: Vec<String> = kept.iter().map(|i| window.names[*i].clone()).collect();
        let dropped_features: Vec<String> = window
            .names
            .iter()
            .enumerate()
            .filter(|(i, _)| !kept.contains(i))
            .map(|(_, name)| name.clone())
            .collect();

        let split = train_test_split(&x, &window.labels, self.config.test_size, self.config.seed)?;

        let mut scaler = StandardScaler::new();
        let x_train = scaler.fit_transform(&split.x_train)?;
        let x_test = scaler.transform(&split.x_test)?;

        let mut model = LogisticRegression::with_c(self.config.regularization_c);
        model.fit(&x_train, &split.y_train)?;

        let y_pred = model.predict(&x_test)?;
        let y_true = split.y_test.to_vec();
        let y_pred = y_pred.to_vec();
        let report = ClassificationReport::new(&y_true, &y_pred);

        let forecasts = self.forecast(frame, &window, &imputer, &scaler, &model)?;

        info!(
            symbol = frame.symbol(),
            window = window.len(),
            train = split.y_train.len(),
            test = y_true.len(),
            accuracy = report.accuracy,
            dropped = dropped_features.len(),
            "Direction model evaluated"
        );

        Ok(PredictionReport {
            window_rows: window.len(),
            train_rows: split.y_train.len(),
            test_rows: y_true.len(),
            features,
            dropped_features,
            accuracy: report.accuracy,
            report,
            forecasts,
        })
    }

    /// 마지막 원시 특성 행을 반복해 미래 봉을 예측합니다.
    fn forecast(
        &self,
        frame: &MarketFrame,
        window: &FeatureTable,
        imputer: &MeanImputer,
        scaler: &StandardScaler,
        model: &LogisticRegression,
    ) -> MlResult<Vec<Forecast>> {
        let horizon = self.config.horizon;
        let last_row = window
            .features
            .index_axis(Axis(0), window.len() - 1)
            .to_owned();
        let repeated = Array2::from_shape_fn((horizon, last_row.len()), |(_, j)| last_row[j]);

        let x = scaler.transform(&imputer.transform(&repeated)?)?;
        let proba = model.predict_proba(&x)?;

        let last_time = frame.last_time().ok_or(MlError::InsufficientData {
            required: 1,
            actual: 0,
        })?;
        let step = frame.timeframe().duration();

        let forecasts = proba
            .iter()
            .enumerate()
            .map(|(k, p)| Forecast {
                time: last_time + step * (k as i32 + 1),
                direction: Direction::from_label(u8::from(*p > 0.5)),
                probability_up: *p,
            })
            .collect();
        Ok(forecasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dash_core::{Kline, Timeframe};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn zigzag_frame(len: usize) -> MarketFrame {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let klines: Vec<Kline> = (0..len)
            .map(|i| {
                let wave = [0i64, 3, 1, 4, 2, 6, 3, 5][i % 8];
                let c = Decimal::from(1000 + i as i64 + wave);
                Kline::new(
                    "BTCUSDT",
                    Timeframe::H4,
                    start + chrono::Duration::hours(4 * i as i64),
                    c - dec!(1),
                    c + dec!(2),
                    c - dec!(2),
                    c,
                    Decimal::from(10 + (i % 5) as i64),
                )
            })
            .collect();
        MarketFrame::from_klines("BTCUSDT", Timeframe::H4, &klines)
            .unwrap()
            .with_standard_indicators(&IndicatorEngine::new())
    }

    #[test]
    fn test_min_rows_for_default_split() {
        let pipeline = DirectionPipeline::new(PipelineConfig::default());
        // n = 6 → 테스트 2, 학습 4
        assert_eq!(pipeline.min_rows(), 6);
    }

    #[test]
    fn test_run_produces_report_and_identical_forecasts() {
        let frame = zigzag_frame(120);
        let config = PipelineConfig {
            training_window: 60,
            horizon: 5,
            ..Default::default()
        };
        let report = DirectionPipeline::new(config)
            .run(&frame, &IndicatorEngine::new())
            .unwrap();

        assert_eq!(report.window_rows, 60);
        assert_eq!(report.test_rows, 12);
        assert_eq!(report.train_rows, 48);
        assert_eq!(report.report.support(), 12);
        assert!((0.0..=1.0).contains(&report.accuracy));
        // 120행이면 EMA_200만 전부 결측
        assert_eq!(report.dropped_features, vec!["EMA_200".to_string()]);
        assert_eq!(report.features.len(), 11);

        assert_eq!(report.forecasts.len(), 5);
        let first = report.forecasts[0];
        assert!(report
            .forecasts
            .iter()
            .all(|f| f.direction == first.direction && f.probability_up == first.probability_up));

        let last_time = frame.last_time().unwrap();
        assert_eq!(first.time, last_time + chrono::Duration::hours(4));
        assert_eq!(report.forecasts[4].time, last_time + chrono::Duration::hours(20));
    }

    #[test]
    fn test_window_larger_than_history_uses_all_rows() {
        let frame = zigzag_frame(40);
        let report = DirectionPipeline::new(PipelineConfig::default())
            .run(&frame, &IndicatorEngine::new())
            .unwrap();
        assert_eq!(report.window_rows, 40);
        assert_eq!(report.test_rows, 8);
        assert_eq!(report.forecasts.len(), 30);
    }

    #[test]
    fn test_too_few_rows() {
        let frame = zigzag_frame(5);
        let err = DirectionPipeline::new(PipelineConfig::default())
            .run(&frame, &IndicatorEngine::new())
            .unwrap_err();
        assert!(matches!(
            err,
            MlError::InsufficientData {
                required: 6,
                actual: 5
            }
        ));
    }
}
