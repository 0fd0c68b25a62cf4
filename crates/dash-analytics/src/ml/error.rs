//! ML 모듈 에러 타입.

use thiserror::Error;

use crate::error::DataError;

/// ML 작업에서 발생할 수 있는 에러.
#[derive(Debug, Error)]
pub enum MlError {
    /// 학습/평가에 필요한 행 부족
    #[error("Insufficient data: need {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// 학습 라벨이 한 종류뿐임
    #[error("Training labels contain a single class: {0}")]
    SingleClass(u8),

    /// 행렬 차원 불일치
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// 학습 전에 변환/예측을 호출함
    #[error("{0} has not been fitted")]
    NotFitted(&'static str),

    /// 유효하지 않은 파라미터
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// 관측값이 있는 특성이 하나도 없음
    #[error("No usable feature columns")]
    NoFeatures,

    /// 테이블 에러
    #[error(transparent)]
    Data(#[from] DataError),
}

/// ML 작업을 위한 Result 타입.
pub type MlResult<T> = Result<T, MlError>;

impl MlError {
    /// 더 긴 기간의 데이터로 다시 시도하면 해결될 수 있는 에러인지 확인.
    pub fn is_data_shortage(&self) -> bool {
        matches!(self, MlError::InsufficientData { .. } | MlError::SingleClass(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MlError::InsufficientData {
            required: 4,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Insufficient data: need 4 samples, got 1");
        assert!(err.is_data_shortage());

        let err = MlError::NotFitted("StandardScaler");
        assert_eq!(err.to_string(), "StandardScaler has not been fitted");
        assert!(!err.is_data_shortage());
    }
}
