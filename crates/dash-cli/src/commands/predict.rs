//! `predict` 명령어: 방향 예측 모델 평가와 미래 봉 예측.

use anyhow::{Context, Result};
use dash_analytics::ml::Forecast;
use dash_analytics::{DirectionPipeline, IndicatorEngine, PipelineConfig, PredictionReport};
use dash_core::{MlConfig, Timeframe};
use dash_exchange::KlineProvider;
use std::fmt;

use super::load::{fetch_frame_with_spinner, LoadRequest};

/// 예측 시각 표시 형식 (일봉 미만은 시:분까지).
pub fn time_format(interval: Timeframe) -> &'static str {
    if interval.duration() < chrono::Duration::days(1) {
        "%Y-%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    }
}

/// 예측 한 줄 ("2024-07-01: Up (p=0.61)").
pub fn format_forecast(forecast: &Forecast, interval: Timeframe) -> String {
    format!(
        "{}: {} (p={:.2})",
        forecast.time.format(time_format(interval)),
        forecast.direction,
        forecast.probability_up
    )
}

/// 예측 목록 제목.
pub fn forecast_heading(horizon: usize, interval: Timeframe) -> String {
    format!(
        "Price Direction Predictions for Next {} {} Bars",
        horizon, interval
    )
}

/// 예측 결과 텍스트.
pub struct PredictionText<'a> {
    pub symbol: &'a str,
    pub interval: Timeframe,
    pub report: &'a PredictionReport,
}

impl fmt::Display for PredictionText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "{} Price Prediction", self.symbol)?;
        writeln!(f)?;
        writeln!(f, "Model Performance")?;
        writeln!(f, "Accuracy: {:.2}", report.accuracy)?;
        writeln!(
            f,
            "Rows: {} (train {}, test {})",
            report.window_rows, report.train_rows, report.test_rows
        )?;
        if !report.dropped_features.is_empty() {
            writeln!(f, "Dropped features: {}", report.dropped_features.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "Classification Report")?;
        writeln!(f, "{}", report.report)?;
        writeln!(f, "{}", forecast_heading(report.forecasts.len(), self.interval))?;
        for forecast in &report.forecasts {
            writeln!(f, "{}", format_forecast(forecast, self.interval))?;
        }
        Ok(())
    }
}

/// 데이터를 조회하고 모델을 평가한 뒤 결과를 출력합니다.
pub async fn run(
    provider: &dyn KlineProvider,
    request: &LoadRequest,
    settings: &MlConfig,
) -> Result<()> {
    let engine = IndicatorEngine::new();
    let frame = fetch_frame_with_spinner(provider, request, &engine).await?;

    let pipeline = DirectionPipeline::new(PipelineConfig::from(settings));
    let report = pipeline
        .run(&frame, &engine)
        .with_context(|| format!("Prediction failed for {}", frame.symbol()))?;

    let text = PredictionText {
        symbol: frame.symbol(),
        interval: request.interval,
        report: &report,
    };
    print!("{}", text);
    Ok(())
}
