//! 대시보드 공통 에러 타입.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum DashError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력 (심볼, 날짜, 범위 등)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 로깅 초기화 에러
    #[error("로깅 초기화 에러: {0}")]
    Logging(String),
}

/// 대시보드 작업을 위한 Result 타입.
pub type DashResult<T> = Result<T, DashError>;

impl From<config::ConfigError> for DashError {
    fn from(err: config::ConfigError) -> Self {
        DashError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashError::InvalidInput("symbol must not be empty".to_string());
        assert_eq!(err.to_string(), "잘못된 입력: symbol must not be empty");
    }
}
