//! 데이터 테이블 에러 타입.

use thiserror::Error;

/// 시장 데이터 테이블 관련 에러.
#[derive(Debug, Error)]
pub enum DataError {
    /// 조회 결과가 비어 있음
    #[error("데이터가 없습니다: {symbol} {interval}")]
    Empty { symbol: String, interval: String },

    /// 존재하지 않는 컬럼
    #[error("알 수 없는 컬럼: {0}")]
    UnknownColumn(String),

    /// 컬럼 길이가 행 수와 다름
    #[error("컬럼 {column} 길이 불일치: 기대 {expected}, 실제 {actual}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// CSV 출력 실패
    #[error("CSV 쓰기 실패: {0}")]
    Csv(#[from] csv::Error),

    /// 출력 스트림 flush 실패
    #[error("출력 실패: {0}")]
    Io(#[from] std::io::Error),
}

/// 데이터 작업 결과 타입.
pub type DataResult<T> = Result<T, DataError>;
