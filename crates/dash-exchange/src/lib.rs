//! 거래소 시장 데이터 연결.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `KlineProvider` trait: 과거 캔들 조회 인터페이스
//! - Binance 공개 REST 커넥터 (페이지 단위 수집)
//! - 거래소 에러 매핑

pub mod binance;
pub mod error;
pub mod traits;

pub use binance::{BinanceClient, BinanceConfig, MAX_KLINES_PER_REQUEST};
pub use error::*;
pub use traits::*;
