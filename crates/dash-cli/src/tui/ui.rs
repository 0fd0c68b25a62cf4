//! 대시보드 화면 그리기.

use dash_analytics::{ChartModel, PredictionReport, RangeSelector, Summary, SummaryEntry};
use dash_core::ChartType;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Tabs, Wrap,
    },
    Frame,
};

use super::app::{App, InputMode, Panel, Tab};
use super::candles::CandleChart;
use crate::commands::predict::{forecast_heading, format_forecast};

const SIDEBAR_WIDTH: u16 = 30;

/// 전체 화면.
pub fn draw(f: &mut Frame, app: &App) {
    let [header, body, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    draw_tabs(f, app, header);

    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(body);
    draw_sidebar(f, app, sidebar);

    match app.tab {
        Tab::Dashboard => draw_dashboard(f, app, main),
        Tab::Prediction => draw_prediction(f, app, main),
    }

    draw_status(f, app, status);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(app.tab.index())
        .block(Block::default().borders(Borders::ALL).title(" dash "))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn sidebar_row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<11}", label), Style::default().fg(Color::Gray)),
        Span::raw(value),
    ])
}

fn checkbox(on: bool) -> String {
    let mark = if on { "[x]" } else { "[ ]" };
    mark.to_string()
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let symbol = match &app.input_mode {
        InputMode::EditingSymbol(buffer) => Line::from(vec![
            Span::styled(format!("{:<11}", "Symbol"), Style::default().fg(Color::Gray)),
            Span::styled(format!("{}_", buffer), Style::default().fg(Color::Yellow)),
        ]),
        InputMode::Normal => sidebar_row("Symbol", app.request.display_symbol()),
    };

    let key_style = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        symbol,
        sidebar_row("Interval", app.request.interval.to_string()),
        sidebar_row("Start", app.request.start_date.to_string()),
        sidebar_row("Chart", app.chart_type.to_string()),
        sidebar_row("Show chart", checkbox(app.show_chart)),
        sidebar_row("Show data", checkbox(app.show_data)),
        sidebar_row("Range", app.range.label().to_string()),
        Line::default(),
        sidebar_row("Window", app.ml.training_window.to_string()),
        sidebar_row("Horizon", app.ml.horizon.to_string()),
        Line::default(),
    ];
    lines.extend(
        [
            "/ symbol   i/I interval",
            "[ ] start  c chart type",
            "g chart    d data",
            "1-5 range  r reload",
            "- = window , . horizon",
            "Tab switch q quit",
        ]
        .into_iter()
        .map(|hint| Line::styled(hint, key_style)),
    );

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Inputs "));
    f.render_widget(paragraph, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.status.is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    f.render_widget(Paragraph::new(app.status.message.as_str()).style(style), area);
}

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let constraints = match (app.show_chart, app.show_data) {
        (true, true) => vec![
            Constraint::Length(8),
            Constraint::Percentage(60),
            Constraint::Min(5),
        ],
        _ => vec![Constraint::Length(8), Constraint::Min(0)],
    };
    let areas = Layout::vertical(constraints).split(area);

    draw_summary(f, app, areas[0]);

    match (app.show_chart, app.show_data) {
        (true, true) => {
            draw_chart(f, app, areas[1]);
            draw_table(f, app, areas[2]);
        }
        (true, false) => draw_chart(f, app, areas[1]),
        (false, true) => draw_table(f, app, areas[1]),
        (false, false) => {}
    }
}

fn message<'a>(text: impl Into<String>, color: Color, title: &'a str) -> Paragraph<'a> {
    Paragraph::new(text.into())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title))
}

fn entry_line(entry: &SummaryEntry) -> Line<'static> {
    let color = match entry.signal {
        Some(signal) if signal.is_positive() => Color::Green,
        Some(_) => Color::Red,
        None => Color::White,
    };
    Line::styled(entry.to_string(), Style::default().fg(color))
}

fn draw_summary(f: &mut Frame, app: &App, area: Rect) {
    let summary: &Summary = match &app.summary {
        Panel::Ready(summary) => summary,
        Panel::Failed(e) => {
            f.render_widget(message(e.as_str(), Color::Red, " Summary "), area);
            return;
        }
        Panel::Empty => {
            f.render_widget(message("No data", Color::Gray, " Summary "), area);
            return;
        }
    };

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", summary.symbol));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(inner);
    let sections = [
        ("Returns", &summary.returns),
        ("Momentum", &summary.momentum),
        ("Trend Strength", &summary.trend_strength),
    ];
    for ((title, entries), column) in sections.iter().zip(columns.iter()) {
        let mut lines = vec![Line::styled(
            *title,
            Style::default().add_modifier(Modifier::BOLD),
        )];
        lines.extend(entries.iter().map(entry_line));
        f.render_widget(Paragraph::new(lines), *column);
    }
}

fn range_line(selected: RangeSelector) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, range) in RangeSelector::ALL.iter().enumerate() {
        let label = format!(" {}:{} ", i + 1, range.label());
        let style = if *range == selected {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn draw_chart(f: &mut Frame, app: &App, area: Rect) {
    let model: &ChartModel = match &app.chart {
        Panel::Ready(model) => model,
        Panel::Failed(e) => {
            f.render_widget(message(e.as_str(), Color::Red, " Chart "), area);
            return;
        }
        Panel::Empty => {
            f.render_widget(message("No data", Color::Gray, " Chart "), area);
            return;
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", model.title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [ranges, price, volume] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Percentage(70),
        Constraint::Percentage(30),
    ])
    .areas(inner);

    f.render_widget(Paragraph::new(range_line(model.range)), ranges);

    if model.is_empty() {
        f.render_widget(Paragraph::new("No rows in range"), price);
        return;
    }

    let x_max = (model.len().saturating_sub(1)).max(1) as f64;
    match model.chart_type {
        ChartType::Candlestick => f.render_widget(CandleChart::new(model), price),
        ChartType::Line => {
            let [lo, hi] = model.price_bounds;
            let datasets = vec![
                Dataset::default()
                    .name("Close")
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::White))
                    .data(&model.close_line),
                Dataset::default()
                    .name("EMA20")
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::Blue))
                    .data(&model.ema20),
                Dataset::default()
                    .name("EMA200")
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::Red))
                    .data(&model.ema200),
            ];
            let chart = Chart::new(datasets)
                .x_axis(Axis::default().bounds([0.0, x_max]))
                .y_axis(
                    Axis::default()
                        .bounds([lo, hi])
                        .labels(vec![format!("{:.2}", lo), format!("{:.2}", hi)]),
                );
            f.render_widget(chart, price);
        }
    }

    let volume_chart = Chart::new(vec![Dataset::default()
        .name("Volume")
        .marker(Marker::HalfBlock)
        .graph_type(GraphType::Bar)
        .style(Style::default().fg(Color::Cyan))
        .data(&model.volume)])
    .x_axis(
        Axis::default()
            .bounds([0.0, x_max])
            .labels(model.time_labels()),
    )
    .y_axis(
        Axis::default()
            .bounds([0.0, model.volume_max.max(1.0)])
            .labels(vec!["0".to_string(), format!("{:.0}", model.volume_max)]),
    );
    f.render_widget(volume_chart, volume);
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let Some(frame) = &app.frame else {
        f.render_widget(message("No data", Color::Gray, " Data "), area);
        return;
    };

    let names = frame.column_names();
    let header = Row::new(names.iter().map(|n| Cell::from(n.to_string())))
        .style(Style::default().add_modifier(Modifier::BOLD));

    let visible = area.height.saturating_sub(3) as usize;
    let time_fmt = if frame.timeframe().duration() < chrono::Duration::days(1) {
        "%Y-%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };
    let rows = frame
        .rows_newest_first()
        .skip(app.scroll)
        .take(visible)
        .map(|i| {
            let mut cells = vec![Cell::from(frame.times()[i].format(time_fmt).to_string())];
            cells.extend(frame.row_values(i).into_iter().map(|v| {
                Cell::from(v.map(|v| format!("{:.2}", v)).unwrap_or_default())
            }));
            Row::new(cells)
        });

    let mut widths = vec![Constraint::Length(16)];
    widths.extend(std::iter::repeat(Constraint::Length(10)).take(names.len() - 1));

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Data ({} rows, newest first) ", frame.len())),
    );
    f.render_widget(table, area);
}

fn draw_prediction(f: &mut Frame, app: &App, area: Rect) {
    let report: &PredictionReport = match &app.prediction {
        Panel::Ready(report) => report,
        Panel::Failed(e) => {
            f.render_widget(message(e.as_str(), Color::Red, " Price Prediction "), area);
            return;
        }
        Panel::Empty => {
            f.render_widget(message("No data", Color::Gray, " Price Prediction "), area);
            return;
        }
    };

    let report_text = report.report.to_string();
    let report_height = report_text.lines().count() as u16 + 2;
    let [performance, classification, forecast] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(report_height),
        Constraint::Min(0),
    ])
    .areas(area);

    let mut perf_lines = vec![Line::from(format!("Accuracy: {:.2}", report.accuracy))];
    let mut detail = format!(
        "Rows: {} (train {}, test {})",
        report.window_rows, report.train_rows, report.test_rows
    );
    if !report.dropped_features.is_empty() {
        detail.push_str(&format!("  dropped: {}", report.dropped_features.join(", ")));
    }
    perf_lines.push(Line::styled(detail, Style::default().fg(Color::Gray)));
    f.render_widget(
        Paragraph::new(perf_lines)
            .block(Block::default().borders(Borders::ALL).title(" Model Performance ")),
        performance,
    );

    f.render_widget(
        Paragraph::new(report_text)
            .block(Block::default().borders(Borders::ALL).title(" Classification Report ")),
        classification,
    );

    let interval = app.request.interval;
    let outer = Block::default().borders(Borders::ALL).title(format!(
        " {} ",
        forecast_heading(report.forecasts.len(), interval)
    ));
    let inner = outer.inner(forecast);
    f.render_widget(outer, forecast);

    let [list, plot] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(inner);

    let lines: Vec<Line> = report
        .forecasts
        .iter()
        .map(|fc| {
            let color = if fc.direction.as_value() == 1 { Color::Green } else { Color::Red };
            Line::styled(format_forecast(fc, interval), Style::default().fg(color))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), list);

    let points: Vec<(f64, f64)> = report
        .forecasts
        .iter()
        .enumerate()
        .map(|(k, fc)| ((k + 1) as f64, fc.direction.as_value() as f64))
        .collect();
    let horizon = report.forecasts.len().max(2) as f64;
    let chart = Chart::new(vec![Dataset::default()
        .name("Direction")
        .marker(Marker::Dot)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(&points)])
    .block(Block::default().borders(Borders::LEFT))
    .x_axis(
        Axis::default()
            .bounds([1.0, horizon])
            .labels(vec!["1".to_string(), format!("{}", horizon as usize)]),
    )
    .y_axis(
        Axis::default()
            .bounds([-0.1, 1.1])
            .labels(vec!["Down".to_string(), "Up".to_string()]),
    );
    f.render_widget(chart, plot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use dash_analytics::ml::{ClassificationReport, Direction, Forecast};
    use dash_core::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draw_without_data() {
        let app = App::new(&AppConfig::default(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Data/Analytics"));
        assert!(text.contains("ML Predictions"));
        assert!(text.contains("BTCUSDT"));
        assert!(text.contains("No data"));
    }

    #[test]
    fn test_prediction_tab_shows_forecast_heading() {
        let mut app = App::new(&AppConfig::default(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        app.tab = Tab::Prediction;
        app.prediction = Panel::Ready(PredictionReport {
            window_rows: 60,
            train_rows: 48,
            test_rows: 12,
            features: vec!["Close".to_string()],
            dropped_features: Vec::new(),
            accuracy: 0.5,
            report: ClassificationReport::new(&[0, 1], &[0, 0]),
            forecasts: (0..3)
                .map(|d| Forecast {
                    time: start + chrono::Duration::days(d),
                    direction: Direction::Up,
                    probability_up: 0.7,
                })
                .collect(),
        });

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Price Direction Predictions for Next 3 1d Bars"));
        assert!(text.contains("2024-07-01: Up (p=0.70)"));
    }

    #[test]
    fn test_range_line_highlights_selection() {
        let line = range_line(RangeSelector::YearToDate);
        assert_eq!(line.spans.len(), 5);
        assert_eq!(line.spans[2].content, " 3:YTD ");
        assert_eq!(line.spans[2].style.bg, Some(Color::Yellow));
        assert_eq!(line.spans[0].style.bg, None);
    }
}
