//! 대시보드 상태와 키 처리.
//!
//! 키 입력은 상태만 바꾸고 필요한 후속 작업(`Action`)을 돌려줍니다.
//! 이벤트 루프가 `Refetch`면 데이터를 다시 받고, `Recompute`면
//! 요약/차트/예측 패널을 다시 계산합니다.

use chrono::{Duration, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dash_analytics::{
    ChartModel, DirectionPipeline, IndicatorEngine, MarketFrame, PipelineConfig,
    PredictionReport, RangeSelector, Summary,
};
use dash_core::{
    AppConfig, ChartType, MAX_HORIZON, MAX_TRAINING_WINDOW, MIN_HORIZON, MIN_TRAINING_WINDOW,
};
use dash_exchange::{BinanceClient, ExchangeError, KlineProvider};
use tracing::{info, warn};

use crate::commands::load::{fetch_frame, LoadRequest};

/// `[`/`]` 키 한 번에 이동하는 시작 날짜 (일).
pub const START_DATE_STEP_DAYS: i64 = 30;
/// `-`/`=` 키 한 번에 바뀌는 학습 윈도우.
pub const WINDOW_STEP: usize = 10;

/// 화면 탭.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Prediction,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Dashboard, Tab::Prediction];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Data/Analytics",
            Tab::Prediction => "ML Predictions",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Dashboard => 0,
            Tab::Prediction => 1,
        }
    }

    fn toggle(self) -> Self {
        match self {
            Tab::Dashboard => Tab::Prediction,
            Tab::Prediction => Tab::Dashboard,
        }
    }
}

/// 입력 모드.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// 심볼 편집 중 (입력 버퍼)
    EditingSymbol(String),
}

/// 키 처리 후 이벤트 루프가 할 일.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// 데이터 재조회 후 재계산
    Refetch,
    /// 현재 데이터로 패널 재계산
    Recompute,
    Quit,
}

/// 패널 하나의 계산 결과.
pub enum Panel<T> {
    /// 아직 데이터 없음
    Empty,
    Ready(T),
    /// 실패 메시지 (이전 결과 대신 표시)
    Failed(String),
}

impl<T> Panel<T> {
    fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Panel::Ready(value),
            Err(e) => Panel::Failed(e.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// 상태 표시줄.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

impl Status {
    /// 조회 중 표시.
    pub fn loading(request: &LoadRequest) -> Self {
        Self::info(format!(
            "Fetching {} {} since {}...",
            request.display_symbol(),
            request.interval,
            request.start_date
        ))
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// 대시보드 애플리케이션 상태.
pub struct App {
    pub tab: Tab,
    pub input_mode: InputMode,
    pub request: LoadRequest,
    pub chart_type: ChartType,
    pub show_chart: bool,
    pub show_data: bool,
    pub range: RangeSelector,
    pub ml: PipelineConfig,
    /// 데이터 테이블 스크롤 (최신 행 기준 오프셋)
    pub scroll: usize,
    pub frame: Option<MarketFrame>,
    pub summary: Panel<Summary>,
    pub chart: Panel<ChartModel>,
    pub prediction: Panel<PredictionReport>,
    pub status: Status,
    engine: IndicatorEngine,
    today: NaiveDate,
}

impl App {
    /// 설정과 오늘 날짜로 초기 상태를 만듭니다.
    pub fn new(config: &AppConfig, today: NaiveDate) -> Self {
        let request = LoadRequest::from_settings(&config.dashboard, today);
        Self {
            tab: Tab::Dashboard,
            input_mode: InputMode::Normal,
            chart_type: config.dashboard.chart_type,
            show_chart: config.dashboard.show_chart,
            show_data: config.dashboard.show_data,
            range: RangeSelector::default(),
            ml: PipelineConfig::from(&config.ml),
            scroll: 0,
            frame: None,
            summary: Panel::Empty,
            chart: Panel::Empty,
            prediction: Panel::Empty,
            status: Status::loading(&request),
            request,
            engine: IndicatorEngine::new(),
            today,
        }
    }

    /// 키 입력을 처리합니다.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        if let InputMode::EditingSymbol(buffer) = &mut self.input_mode {
            return match key.code {
                KeyCode::Enter => {
                    let symbol = BinanceClient::normalize_symbol(buffer);
                    self.input_mode = InputMode::Normal;
                    if symbol.is_empty() || symbol == self.request.display_symbol() {
                        Action::None
                    } else {
                        self.request.symbol = symbol;
                        Action::Refetch
                    }
                }
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    Action::None
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    Action::None
                }
                KeyCode::Char(c) if !c.is_whitespace() => {
                    buffer.push(c.to_ascii_uppercase());
                    Action::None
                }
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Tab => {
                self.tab = self.tab.toggle();
                Action::None
            }
            KeyCode::Char('/') => {
                self.input_mode = InputMode::EditingSymbol(String::new());
                Action::None
            }
            KeyCode::Char('i') => {
                self.request.interval = self.request.interval.next();
                Action::Refetch
            }
            KeyCode::Char('I') => {
                self.request.interval = self.request.interval.prev();
                Action::Refetch
            }
            KeyCode::Char('[') => self.shift_start(-START_DATE_STEP_DAYS),
            KeyCode::Char(']') => self.shift_start(START_DATE_STEP_DAYS),
            KeyCode::Char('c') => {
                self.chart_type = self.chart_type.toggle();
                Action::Recompute
            }
            KeyCode::Char('g') => {
                self.show_chart = !self.show_chart;
                Action::None
            }
            KeyCode::Char('d') => {
                self.show_data = !self.show_data;
                Action::None
            }
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.range = RangeSelector::ALL[idx];
                Action::Recompute
            }
            KeyCode::Char('-') => self.set_window(self.ml.training_window.saturating_sub(WINDOW_STEP)),
            KeyCode::Char('=') | KeyCode::Char('+') => {
                self.set_window(self.ml.training_window + WINDOW_STEP)
            }
            KeyCode::Char(',') => self.set_horizon(self.ml.horizon.saturating_sub(1)),
            KeyCode::Char('.') => self.set_horizon(self.ml.horizon + 1),
            KeyCode::Char('r') => Action::Refetch,
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                let max = self.frame.as_ref().map_or(0, |f| f.len().saturating_sub(1));
                self.scroll = (self.scroll + 1).min(max);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn shift_start(&mut self, days: i64) -> Action {
        let shifted = (self.request.start_date + Duration::days(days)).min(self.today);
        if shifted == self.request.start_date {
            return Action::None;
        }
        self.request.start_date = shifted;
        Action::Refetch
    }

    fn set_window(&mut self, window: usize) -> Action {
        let window = window.clamp(MIN_TRAINING_WINDOW, MAX_TRAINING_WINDOW);
        if window == self.ml.training_window {
            return Action::None;
        }
        self.ml.training_window = window;
        Action::Recompute
    }

    fn set_horizon(&mut self, horizon: usize) -> Action {
        let horizon = horizon.clamp(MIN_HORIZON, MAX_HORIZON);
        if horizon == self.ml.horizon {
            return Action::None;
        }
        self.ml.horizon = horizon;
        Action::Recompute
    }

    /// 데이터를 다시 조회하고 패널을 재계산합니다.
    ///
    /// 조회에 실패하면 모든 패널을 비우고 상태 표시줄에 에러를 표시합니다.
    pub async fn reload(&mut self, provider: &dyn KlineProvider) {
        self.scroll = 0;
        match fetch_frame(provider, &self.request, &self.engine).await {
            Ok(frame) => {
                self.frame = Some(frame);
                self.recompute();
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Dashboard load failed");
                let transient = e
                    .downcast_ref::<ExchangeError>()
                    .is_some_and(ExchangeError::is_transient);
                self.frame = None;
                self.summary = Panel::Empty;
                self.chart = Panel::Empty;
                self.prediction = Panel::Empty;
                self.status = if transient {
                    Status::error(format!("{:#} (press r to retry)", e))
                } else {
                    Status::error(format!("{:#}", e))
                };
            }
        }
    }

    /// 현재 테이블로 요약, 차트, 예측을 다시 계산합니다.
    pub fn recompute(&mut self) {
        let Some(frame) = &self.frame else {
            return;
        };

        self.summary = Panel::from_result(Summary::from_frame(frame));
        self.chart = Panel::from_result(ChartModel::build(frame, self.chart_type, self.range));

        let pipeline = DirectionPipeline::new(self.ml);
        self.prediction = match pipeline.run(frame, &self.engine) {
            Ok(report) => Panel::Ready(report),
            Err(e) if e.is_data_shortage() => Panel::Failed(format!(
                "{}. Try an earlier start date or a smaller training window.",
                e
            )),
            Err(e) => Panel::Failed(e.to_string()),
        };

        self.status = match &self.prediction {
            Panel::Failed(e) => Status::error(format!("Prediction: {}", e)),
            _ => Status::info(format!(
                "{} {} rows since {}",
                frame.symbol(),
                frame.len(),
                self.request.start_date
            )),
        };

        info!(
            symbol = frame.symbol(),
            interval = %self.request.interval,
            range = self.range.label(),
            window = self.ml.training_window,
            horizon = self.ml.horizon,
            "Dashboard recomputed"
        );
    }

    /// 이벤트 루프에서 받은 후속 작업을 실행합니다. 종료 요청이면 false.
    pub async fn apply(&mut self, action: Action, provider: &dyn KlineProvider) -> bool {
        match action {
            Action::Quit => return false,
            Action::Refetch => self.reload(provider).await,
            Action::Recompute => self.recompute(),
            Action::None => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use dash_core::{Kline, Timeframe};
    use dash_exchange::ExchangeResult;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// 호출 기록을 남기는 가짜 제공자.
    struct FakeProvider {
        calls: Mutex<Vec<(String, Timeframe, DateTime<Utc>)>>,
        fail: bool,
    }

    impl FakeProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl KlineProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn get_historical_klines(
            &self,
            symbol: &str,
            timeframe: Timeframe,
            start: DateTime<Utc>,
        ) -> ExchangeResult<Vec<Kline>> {
            self.calls
                .lock()
                .unwrap()
                .push((symbol.to_string(), timeframe, start));
            if self.fail {
                return Err(ExchangeError::SymbolNotFound(symbol.to_string()));
            }
            Ok((0..120)
                .map(|i| {
                    let wave = [0i64, 3, 1, 4, 2, 6, 3, 5][i % 8];
                    let c = Decimal::from(500 + i as i64 + wave);
                    Kline::new(
                        symbol,
                        timeframe,
                        start + timeframe.duration() * i as i32,
                        c - dec!(1),
                        c + dec!(2),
                        c - dec!(2),
                        c,
                        Decimal::from(20 + (i % 7) as i64),
                    )
                })
                .collect())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn app() -> App {
        App::new(&AppConfig::default(), today())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_initial_state_from_config() {
        let app = app();
        assert_eq!(app.request.symbol, "BTCUSDT");
        assert_eq!(app.request.interval, Timeframe::D1);
        assert_eq!(app.request.start_date, NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        assert_eq!(app.ml.training_window, 180);
        assert_eq!(app.range, RangeSelector::All);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_symbol_editing() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('/'))), Action::None);
        for c in "eth".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input_mode, InputMode::EditingSymbol("ETH".to_string()));
        for c in "usdt".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::Refetch);
        assert_eq!(app.request.symbol, "ETHUSDT");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_symbol_edit_normalizes_pair_notation() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('/')));
        for c in "btc/usdt".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        // 이미 조회 중인 심볼과 같음
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::None);
        assert_eq!(app.request.symbol, "BTCUSDT");

        app.handle_key(key(KeyCode::Char('/')));
        for c in "sol-usdt".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::Refetch);
        assert_eq!(app.request.symbol, "SOLUSDT");
        assert_eq!(app.request.display_symbol(), "SOLUSDT");
    }

    #[test]
    fn test_symbol_edit_cancel_and_empty() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('/')));
        app.handle_key(key(KeyCode::Char('s')));
        // 편집 중 Esc는 종료가 아니라 취소
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::None);
        assert_eq!(app.request.symbol, "BTCUSDT");

        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::None);
        assert_eq!(app.request.symbol, "BTCUSDT");
    }

    #[test]
    fn test_interval_cycling_refetches() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('i'))), Action::Refetch);
        assert_eq!(app.request.interval, Timeframe::D3);
        assert_eq!(app.handle_key(key(KeyCode::Char('I'))), Action::Refetch);
        assert_eq!(app.handle_key(key(KeyCode::Char('I'))), Action::Refetch);
        assert_eq!(app.request.interval, Timeframe::H12);
    }

    #[test]
    fn test_start_date_never_passes_today() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('['))), Action::Refetch);
        assert_eq!(app.request.start_date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());

        app.request.start_date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        assert_eq!(app.handle_key(key(KeyCode::Char(']'))), Action::Refetch);
        assert_eq!(app.request.start_date, today());
        assert_eq!(app.handle_key(key(KeyCode::Char(']'))), Action::None);
    }

    #[test]
    fn test_window_and_horizon_are_clamped() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('='))), Action::Recompute);
        assert_eq!(app.ml.training_window, 190);

        app.ml.training_window = 35;
        assert_eq!(app.handle_key(key(KeyCode::Char('-'))), Action::Recompute);
        assert_eq!(app.ml.training_window, MIN_TRAINING_WINDOW);
        assert_eq!(app.handle_key(key(KeyCode::Char('-'))), Action::None);

        app.ml.horizon = MAX_HORIZON;
        assert_eq!(app.handle_key(key(KeyCode::Char('.'))), Action::None);
        assert_eq!(app.handle_key(key(KeyCode::Char(','))), Action::Recompute);
        assert_eq!(app.ml.horizon, MAX_HORIZON - 1);
    }

    #[test]
    fn test_view_toggles() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('c'))), Action::Recompute);
        assert_eq!(app.chart_type, ChartType::Line);
        assert_eq!(app.handle_key(key(KeyCode::Char('g'))), Action::None);
        assert!(!app.show_chart);
        assert_eq!(app.handle_key(key(KeyCode::Char('d'))), Action::None);
        assert!(!app.show_data);
        assert_eq!(app.handle_key(key(KeyCode::Char('3'))), Action::Recompute);
        assert_eq!(app.range, RangeSelector::YearToDate);
        assert_eq!(app.handle_key(key(KeyCode::Tab)), Action::None);
        assert_eq!(app.tab, Tab::Prediction);
    }

    #[tokio::test]
    async fn test_reload_fills_every_panel() {
        let provider = FakeProvider::new(false);
        let mut app = app();
        assert!(app.apply(Action::Refetch, &provider).await);

        assert_eq!(provider.call_count(), 1);
        assert_eq!(app.frame.as_ref().map(|f| f.len()), Some(120));
        assert!(app.summary.ready().is_some());
        assert!(app.chart.ready().is_some());
        let report = app.prediction.ready().expect("prediction");
        assert_eq!(report.window_rows, 120);
        assert_eq!(report.forecasts.len(), 30);
        assert!(!app.status.is_error);

        let start = provider.calls.lock().unwrap()[0].2;
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_recompute_uses_new_horizon_without_refetch() {
        let provider = FakeProvider::new(false);
        let mut app = app();
        app.apply(Action::Refetch, &provider).await;

        let action = app.handle_key(key(KeyCode::Char(',')));
        app.apply(action, &provider).await;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(app.prediction.ready().map(|r| r.forecasts.len()), Some(29));
    }

    #[tokio::test]
    async fn test_failed_reload_clears_panels() {
        let provider = FakeProvider::new(false);
        let mut app = app();
        app.apply(Action::Refetch, &provider).await;

        let failing = FakeProvider::new(true);
        app.apply(Action::Refetch, &failing).await;

        assert!(app.frame.is_none());
        assert!(matches!(app.summary, Panel::Empty));
        assert!(app.status.is_error);
        assert!(app.status.message.contains("BTCUSDT"));
    }

    #[tokio::test]
    async fn test_transient_failure_suggests_retry() {
        struct RateLimited;

        #[async_trait]
        impl KlineProvider for RateLimited {
            fn name(&self) -> &str {
                "limited"
            }

            async fn get_historical_klines(
                &self,
                _symbol: &str,
                _timeframe: Timeframe,
                _start: DateTime<Utc>,
            ) -> ExchangeResult<Vec<Kline>> {
                Err(ExchangeError::RateLimited)
            }
        }

        let mut app = app();
        app.reload(&RateLimited).await;
        assert!(app.status.message.ends_with("(press r to retry)"));
    }

    #[tokio::test]
    async fn test_short_history_reports_data_shortage() {
        let provider = FakeProvider::new(false);
        let mut app = app();
        app.apply(Action::Refetch, &provider).await;

        // 남은 행이 너무 적도록 테이블을 잘라서 재계산
        let frame = app.frame.take().unwrap();
        let klines: Vec<Kline> = (0..4)
            .map(|i| {
                Kline::new(
                    "BTCUSDT",
                    Timeframe::D1,
                    frame.times()[i],
                    frame.open()[i],
                    frame.high()[i],
                    frame.low()[i],
                    frame.close()[i],
                    frame.volume()[i],
                )
            })
            .collect();
        app.frame = Some(
            MarketFrame::from_klines("BTCUSDT", Timeframe::D1, &klines)
                .unwrap()
                .with_standard_indicators(&IndicatorEngine::new()),
        );
        app.recompute();

        match &app.prediction {
            Panel::Failed(msg) => assert!(msg.contains("Insufficient data")),
            _ => panic!("expected prediction failure"),
        }
        assert!(app.summary.ready().is_some());
        assert!(app.status.is_error);
    }

    #[tokio::test]
    async fn test_quit_stops_loop() {
        let provider = FakeProvider::new(false);
        let mut app = app();
        assert!(!app.apply(Action::Quit, &provider).await);
        assert_eq!(provider.call_count(), 0);
    }
}
