//! # Dash Core
//!
//! 암호화폐 기술적 분석 대시보드의 핵심 타입을 제공합니다.
//!
//! - 시장 데이터 구조체 (`Kline`)
//! - 타임프레임 및 차트 유형 정의
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
