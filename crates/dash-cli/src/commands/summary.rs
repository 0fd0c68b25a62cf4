//! `summary` 명령어: 요약 패널 출력.

use anyhow::Result;
use dash_analytics::{IndicatorEngine, MarketFrame, Summary};
use dash_exchange::KlineProvider;

use super::load::{fetch_frame_with_spinner, LoadRequest};

/// 요약 패널 텍스트를 만듭니다.
pub fn render(frame: &MarketFrame) -> Result<String> {
    let summary = Summary::from_frame(frame)?;
    Ok(format!("{}\n\n{}", summary.symbol, summary))
}

/// 데이터를 조회하고 요약을 출력합니다.
pub async fn run(provider: &dyn KlineProvider, request: &LoadRequest) -> Result<()> {
    let engine = IndicatorEngine::new();
    let frame = fetch_frame_with_spinner(provider, request, &engine).await?;
    println!("{}", render(&frame)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dash_core::{Kline, Timeframe};
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_short_history() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let klines: Vec<Kline> = (0..10)
            .map(|d| {
                Kline::new(
                    "BTCUSDT",
                    Timeframe::D1,
                    start + chrono::Duration::days(d),
                    dec!(100),
                    dec!(101),
                    dec!(99),
                    dec!(100),
                    dec!(5),
                )
            })
            .collect();
        let frame = MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &klines)
            .unwrap()
            .with_standard_indicators(&IndicatorEngine::new());

        let text = render(&frame).unwrap();
        assert!(text.starts_with("BTCUSDT\n\nReturns\n"));
        let one_month = text.lines().find(|l| l.starts_with("- 1 MONTH")).unwrap();
        assert_eq!(one_month, "- 1 MONTH : 0.00% ✅");
        assert!(text.contains("- EMA200 : N/A 🔴"));
        assert!(text.contains("Trend Strength"));
    }
}
