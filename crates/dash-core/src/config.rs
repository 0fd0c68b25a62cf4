//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → `DASH__*` 환경 변수 순서로 겹쳐 로드합니다.
//! CLI 플래그는 로드된 설정 위에 덮어씁니다.

use crate::error::{DashError, DashResult};
use crate::logging::LogFormat;
use crate::types::{ChartType, Timeframe};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 학습 윈도우 최소 행 수.
pub const MIN_TRAINING_WINDOW: usize = 30;
/// 학습 윈도우 최대 행 수.
pub const MAX_TRAINING_WINDOW: usize = 365;
/// 예측 horizon 최소 봉 수.
pub const MIN_HORIZON: usize = 1;
/// 예측 horizon 최대 봉 수.
pub const MAX_HORIZON: usize = 100;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 대시보드 입력 기본값
    pub dashboard: DashboardConfig,
    /// ML 파이프라인 설정
    pub ml: MlConfig,
    /// 거래소 설정
    pub exchange: ExchangeConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 대시보드 입력 (사이드바) 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 거래 심볼 (Binance 티커)
    pub symbol: String,
    /// 캔들 간격
    pub interval: Timeframe,
    /// 시작 날짜. 없으면 오늘로부터 `lookback_days` 전
    pub start_date: Option<NaiveDate>,
    /// 시작 날짜 기본 조회 기간 (일)
    pub lookback_days: i64,
    /// 가격 차트 유형
    pub chart_type: ChartType,
    /// 차트 표시 여부
    pub show_chart: bool,
    /// 데이터 테이블 표시 여부
    pub show_data: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: Timeframe::D1,
            start_date: None,
            lookback_days: 365,
            chart_type: ChartType::Candlestick,
            show_chart: true,
            show_data: true,
        }
    }
}

impl DashboardConfig {
    /// 실제로 사용할 시작 날짜를 계산합니다.
    ///
    /// 미래 날짜는 오늘로 제한합니다.
    pub fn resolve_start_date(&self, today: NaiveDate) -> NaiveDate {
        let start = self
            .start_date
            .unwrap_or_else(|| today - Duration::days(self.lookback_days));
        start.min(today)
    }
}

/// ML 파이프라인 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MlConfig {
    /// 학습에 사용할 최근 행 수
    pub training_window: usize,
    /// 예측할 미래 봉 수
    pub horizon: usize,
    /// 테스트 세트 비율
    pub test_size: f64,
    /// 분할/모델 시드
    pub seed: u64,
    /// 로지스틱 회귀 역정규화 강도 (C)
    pub regularization_c: f64,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            training_window: 180,
            horizon: 30,
            test_size: 0.2,
            seed: 42,
            regularization_c: 1.0,
        }
    }
}

/// 거래소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// REST API 기본 URL
    pub rest_base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 요청당 최대 캔들 수
    pub page_limit: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.binance.com".to_string(),
            timeout_secs: 30,
            page_limit: 1000,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 대시보드 모드에서 사용할 로그 파일
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: Some("dash.log".to_string()),
        }
    }
}

impl AppConfig {
    /// 설정 파일(없어도 됨)과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> DashResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("DASH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 입력 범위를 검증합니다.
    pub fn validate(&self) -> DashResult<()> {
        if self.dashboard.symbol.trim().is_empty() {
            return Err(DashError::InvalidInput("symbol must not be empty".to_string()));
        }
        if !(MIN_TRAINING_WINDOW..=MAX_TRAINING_WINDOW).contains(&self.ml.training_window) {
            return Err(DashError::InvalidInput(format!(
                "training window must be within {}..={}, got {}",
                MIN_TRAINING_WINDOW, MAX_TRAINING_WINDOW, self.ml.training_window
            )));
        }
        if !(MIN_HORIZON..=MAX_HORIZON).contains(&self.ml.horizon) {
            return Err(DashError::InvalidInput(format!(
                "horizon must be within {}..={}, got {}",
                MIN_HORIZON, MAX_HORIZON, self.ml.horizon
            )));
        }
        if !(self.ml.test_size > 0.0 && self.ml.test_size < 1.0) {
            return Err(DashError::InvalidInput(format!(
                "test size must be within (0, 1), got {}",
                self.ml.test_size
            )));
        }
        if self.ml.regularization_c <= 0.0 {
            return Err(DashError::InvalidInput(
                "regularization C must be positive".to_string(),
            ));
        }
        if self.exchange.page_limit == 0 || self.exchange.page_limit > 1000 {
            return Err(DashError::InvalidInput(format!(
                "page limit must be within 1..=1000, got {}",
                self.exchange.page_limit
            )));
        }
        self.logging
            .format
            .parse::<LogFormat>()
            .map_err(DashError::InvalidInput)?;
        Ok(())
    }
}
