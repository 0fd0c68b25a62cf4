//! 캔들 조회와 지표 테이블 구성.
//!
//! 모든 서브커맨드와 대시보드가 같은 경로로 데이터를 준비합니다:
//! 거래소 조회 → `MarketFrame` → 표준 지표 추가.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use dash_analytics::{IndicatorEngine, MarketFrame};
use dash_core::{DashboardConfig, ExchangeConfig, Timeframe};
use dash_exchange::{BinanceClient, BinanceConfig, KlineProvider};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

/// 한 번의 조회 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub symbol: String,
    pub interval: Timeframe,
    pub start_date: NaiveDate,
}

impl LoadRequest {
    /// 대시보드 설정에서 요청을 만듭니다.
    pub fn from_settings(settings: &DashboardConfig, today: NaiveDate) -> Self {
        Self {
            symbol: settings.symbol.clone(),
            interval: settings.interval,
            start_date: settings.resolve_start_date(today),
        }
    }

    /// 조회 시작 시각 (UTC 자정).
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_date.and_time(NaiveTime::MIN).and_utc()
    }

    /// 표시용 심볼 (거래소 형식, "btc/usdt" → "BTCUSDT").
    pub fn display_symbol(&self) -> String {
        BinanceClient::normalize_symbol(&self.symbol)
    }
}

/// 설정에서 Binance 클라이언트를 생성합니다.
pub fn binance_client(settings: &ExchangeConfig) -> Result<BinanceClient> {
    BinanceClient::new(BinanceConfig::from_settings(settings))
        .context("Failed to create Binance client")
}

/// 캔들을 조회하고 표준 지표가 추가된 테이블을 만듭니다.
pub async fn fetch_frame(
    provider: &dyn KlineProvider,
    request: &LoadRequest,
    engine: &IndicatorEngine,
) -> Result<MarketFrame> {
    let klines = provider
        .get_historical_klines(&request.symbol, request.interval, request.start_time())
        .await
        .with_context(|| {
            format!(
                "Failed to fetch {} {} klines from {}",
                request.display_symbol(),
                request.interval,
                provider.name()
            )
        })?;

    let frame = MarketFrame::from_klines(&request.display_symbol(), request.interval, &klines)?
        .with_standard_indicators(engine);

    info!(
        symbol = frame.symbol(),
        interval = %request.interval,
        rows = frame.len(),
        "Market frame ready"
    );

    Ok(frame)
}

/// 스피너를 표시하며 조회합니다 (비대화형 명령용).
pub async fn fetch_frame_with_spinner(
    provider: &dyn KlineProvider,
    request: &LoadRequest,
    engine: &IndicatorEngine,
) -> Result<MarketFrame> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!(
        "Fetching {} {} since {}...",
        request.display_symbol(),
        request.interval,
        request.start_date
    ));

    let result = fetch_frame(provider, request, engine).await;
    match &result {
        Ok(frame) => pb.finish_with_message(format!("Loaded {} rows", frame.len())),
        Err(_) => pb.finish_and_clear(),
    }
    result
}
