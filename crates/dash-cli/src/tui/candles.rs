//! 캔들스틱 위젯.
//!
//! 한 열에 캔들 하나를 그립니다. 캔들이 폭보다 많으면 인접 캔들을
//! 묶어 하나의 OHLC로 합칩니다. EMA 오버레이는 같은 가격 축에 점으로 찍습니다.

use dash_analytics::{CandlePoint, ChartModel};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// 왼쪽 가격 축 폭.
const AXIS_WIDTH: u16 = 11;

/// 한 열에 들어가는 캔들 수.
fn chunk_size(len: usize, width: usize) -> usize {
    if width == 0 {
        return len.max(1);
    }
    len.div_ceil(width).max(1)
}

/// 캔들을 `width` 열 이하로 묶습니다.
pub fn bucket_candles(candles: &[CandlePoint], width: usize) -> Vec<CandlePoint> {
    let chunk = chunk_size(candles.len(), width);
    candles
        .chunks(chunk)
        .enumerate()
        .filter_map(|(i, group)| {
            let first = group.first()?;
            let last = group.last()?;
            Some(CandlePoint {
                x: i as f64,
                open: first.open,
                close: last.close,
                high: group.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max),
                low: group.iter().map(|c| c.low).fold(f64::INFINITY, f64::min),
            })
        })
        .collect()
}

/// 가격/EMA 캔들 차트.
pub struct CandleChart<'a> {
    model: &'a ChartModel,
}

impl<'a> CandleChart<'a> {
    pub fn new(model: &'a ChartModel) -> Self {
        Self { model }
    }
}

impl Widget for CandleChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.model.is_empty() || area.width <= AXIS_WIDTH || area.height < 2 {
            return;
        }

        let [y_min, y_max] = self.model.price_bounds;
        let span = (y_max - y_min).max(1e-9);
        let height = area.height as i32;
        let row_min = area.y as i32;
        let row_max = row_min + height - 1;

        let to_row = |price: f64| -> i32 {
            let ratio = ((price - y_min) / span).clamp(0.0, 1.0);
            row_max - (ratio * (height as f64 - 1.0)).round() as i32
        };

        // 가격 축 (위, 가운데, 아래)
        let label_style = Style::default().fg(Color::Gray);
        for price in [y_max, (y_min + y_max) / 2.0, y_min] {
            let row = to_row(price).clamp(row_min, row_max) as u16;
            buf.set_string(area.x, row, format!("{:>10.2}", price), label_style);
        }

        let plot = Rect {
            x: area.x + AXIS_WIDTH,
            width: area.width - AXIS_WIDTH,
            ..area
        };
        let len = self.model.candles.len();
        let chunk = chunk_size(len, plot.width as usize);

        for candle in bucket_candles(&self.model.candles, plot.width as usize) {
            let x = plot.x + candle.x as u16;
            let color = if candle.is_bullish() { Color::Green } else { Color::Red };

            let (wick_top, wick_bottom) = (to_row(candle.high), to_row(candle.low));
            for y in wick_top.max(row_min)..=wick_bottom.min(row_max) {
                if let Some(cell) = buf.cell_mut((x, y as u16)) {
                    cell.set_symbol("│").set_fg(color);
                }
            }

            let (a, b) = (to_row(candle.open), to_row(candle.close));
            for y in a.min(b).max(row_min)..=a.max(b).min(row_max) {
                if let Some(cell) = buf.cell_mut((x, y as u16)) {
                    cell.set_symbol("█").set_fg(color);
                }
            }
        }

        for (series, color) in [(&self.model.ema20, Color::Blue), (&self.model.ema200, Color::Red)] {
            for (x, y) in series.iter() {
                let col = (*x as usize) / chunk;
                if col >= plot.width as usize {
                    continue;
                }
                let row = to_row(*y);
                if let Some(cell) = buf.cell_mut((plot.x + col as u16, row as u16)) {
                    cell.set_symbol("•").set_fg(color);
                }
            }
        }
    }
}
