//! 암호화폐 기술적 분석 대시보드 CLI.
//!
//! - 대화형 터미널 대시보드 (`tui`)
//! - 요약, 예측, 데이터 테이블 출력 명령어 (`commands`)

pub mod commands;
pub mod tui;
