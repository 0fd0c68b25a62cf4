//! Binance 현물 시장 데이터 커넥터.
//!
//! 인증이 필요 없는 공개 REST API(`/api/v3/klines`)만 사용합니다.
//! 한 번의 요청은 최대 1000개 캔들을 반환하므로 시작 시점부터
//! 현재까지 페이지를 넘기며 모두 수집합니다.

use crate::traits::{ExchangeResult, KlineProvider};
use crate::ExchangeError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dash_core::{ExchangeConfig, Kline, Timeframe};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Binance 요청당 최대 캔들 수.
pub const MAX_KLINES_PER_REQUEST: u32 = 1000;

/// Binance 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 페이지당 캔들 수
    pub page_limit: u32,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            timeout_secs: 30,
            page_limit: MAX_KLINES_PER_REQUEST,
        }
    }
}

impl BinanceConfig {
    /// 기본 URL을 지정하여 생성 (테스트 서버 등).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// 페이지 크기 설정 (1..=1000으로 제한).
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.clamp(1, MAX_KLINES_PER_REQUEST);
        self
    }

    /// 애플리케이션 설정의 `[exchange]` 섹션에서 생성.
    pub fn from_settings(settings: &ExchangeConfig) -> Self {
        Self {
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
            timeout_secs: settings.timeout_secs,
            page_limit: settings.page_limit.clamp(1, MAX_KLINES_PER_REQUEST),
        }
    }
}

/// `/api/v3/klines` 응답의 한 행.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct BinanceKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time
    String, // 7: Quote asset volume
    u64,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

#[derive(Debug, Deserialize)]
struct BinanceError {
    code: i32,
    msg: String,
}

/// Binance 공개 시장 데이터 클라이언트.
pub struct BinanceClient {
    config: BinanceConfig,
    client: Client,
}

impl BinanceClient {
    /// 새 Binance 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: BinanceConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 사용자 입력 심볼을 Binance 형식으로 변환 ("btc/usdt" → "BTCUSDT").
    pub fn normalize_symbol(symbol: &str) -> String {
        symbol
            .trim()
            .chars()
            .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
            .collect::<String>()
            .to_uppercase()
    }

    fn build_query(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 공개 API GET 요청.
    async fn public_get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let url = format!("{}{}?{}", self.config.base_url, endpoint, Self::build_query(params));

        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                ExchangeError::ParseError(e.to_string())
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
            return Err(ExchangeError::RateLimited);
        }

        match serde_json::from_str::<BinanceError>(&body) {
            Ok(err) => Err(Self::map_error_code(err.code, &err.msg)),
            Err(_) => Err(ExchangeError::ApiError {
                code: status.as_u16() as i32,
                message: body,
            }),
        }
    }

    /// Binance 에러 코드를 ExchangeError로 매핑.
    fn map_error_code(code: i32, msg: &str) -> ExchangeError {
        match code {
            -1003 => ExchangeError::RateLimited,
            -1121 => ExchangeError::SymbolNotFound(msg.to_string()),
            -1102..=-1100 | -1120 => ExchangeError::InvalidRequest(msg.to_string()),
            _ => ExchangeError::ApiError {
                code,
                message: msg.to_string(),
            },
        }
    }

    fn parse_decimal(field: &str, value: &str) -> ExchangeResult<Decimal> {
        Decimal::from_str(value)
            .map_err(|e| ExchangeError::ParseError(format!("{} '{}': {}", field, value, e)))
    }

    fn parse_time(field: &str, millis: i64) -> ExchangeResult<DateTime<Utc>> {
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| ExchangeError::ParseError(format!("{} out of range: {}", field, millis)))
    }

    fn to_kline(ticker: &str, timeframe: Timeframe, row: BinanceKline) -> ExchangeResult<Kline> {
        Ok(Kline {
            ticker: ticker.to_string(),
            timeframe,
            open_time: Self::parse_time("open time", row.0)?,
            open: Self::parse_decimal("open", &row.1)?,
            high: Self::parse_decimal("high", &row.2)?,
            low: Self::parse_decimal("low", &row.3)?,
            close: Self::parse_decimal("close", &row.4)?,
            volume: Self::parse_decimal("volume", &row.5)?,
            close_time: Self::parse_time("close time", row.6)?,
            quote_volume: Some(Self::parse_decimal("quote volume", &row.7)?),
            num_trades: Some(row.8),
        })
    }

    /// 캔들 한 페이지를 조회합니다.
    async fn get_kline_page(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start_ms: i64,
    ) -> ExchangeResult<Vec<BinanceKline>> {
        self.public_get(
            "/api/v3/klines",
            &[
                ("symbol", symbol.to_string()),
                ("interval", timeframe.as_binance_interval().to_string()),
                ("startTime", start_ms.to_string()),
                ("limit", self.config.page_limit.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl KlineProvider for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    async fn get_historical_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Kline>> {
        let ticker = Self::normalize_symbol(symbol);
        if ticker.is_empty() {
            return Err(ExchangeError::InvalidRequest("empty symbol".to_string()));
        }

        let mut klines = Vec::new();
        let mut start_ms = start.timestamp_millis();
        let mut pages = 0usize;

        loop {
            let page = self.get_kline_page(&ticker, timeframe, start_ms).await?;
            pages += 1;
            let fetched = page.len();

            let Some(last_open) = page.last().map(|row| row.0) else {
                break;
            };
            for row in page {
                klines.push(Self::to_kline(&ticker, timeframe, row)?);
            }

            debug!(page = pages, fetched, "kline page received");

            if fetched < self.config.page_limit as usize {
                break;
            }
            start_ms = last_open + 1;
        }

        info!(
            symbol = %ticker,
            interval = %timeframe,
            count = klines.len(),
            pages,
            "Fetched historical klines"
        );

        Ok(klines)
    }
}
