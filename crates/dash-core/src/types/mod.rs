//! 대시보드 전반에서 사용되는 기본 타입.

pub mod chart;
pub mod timeframe;

pub use chart::ChartType;
pub use timeframe::Timeframe;
