//! 시장 데이터 제공자 트레잇.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dash_core::{Kline, Timeframe};

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 과거 캔들 데이터 제공자.
///
/// 대시보드는 렌더링마다 한 번 호출하며, 구현체는 `start`부터 현재까지의
/// 캔들을 오래된 순서로 반환해야 합니다.
#[async_trait]
pub trait KlineProvider: Send + Sync {
    /// 제공자 이름.
    fn name(&self) -> &str;

    /// `start` 이후의 모든 캔들을 조회합니다.
    async fn get_historical_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Kline>>;
}
