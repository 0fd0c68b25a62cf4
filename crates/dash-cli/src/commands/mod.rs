//! CLI 명령어 구현 모듈.

pub mod intervals;
pub mod load;
pub mod predict;
pub mod summary;
pub mod table;

// 각 서브모듈 직접 사용 권장
