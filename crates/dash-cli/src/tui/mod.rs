//! 대화형 터미널 대시보드.
//!
//! 두 개의 탭(대시보드, 가격 예측)과 입력 사이드바로 구성됩니다.
//! 조회는 이벤트 루프 안에서 바로 기다리며, 별도 백그라운드 작업은 없습니다.

pub mod app;
pub mod candles;
pub mod ui;

use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dash_core::AppConfig;
use dash_exchange::KlineProvider;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::info;

pub use app::{Action, App};

type DashTerminal = Terminal<CrosstermBackend<Stdout>>;

/// 키 입력 대기 간격.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

fn setup_terminal() -> Result<DashTerminal> {
    // 패닉 시에도 터미널 복구
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut DashTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// 대시보드를 실행합니다. `q` 또는 `Esc`로 종료합니다.
pub async fn run(config: &AppConfig, provider: &dyn KlineProvider) -> Result<()> {
    let mut app = App::new(config, Utc::now().date_naive());
    let mut terminal = setup_terminal()?;

    let result = event_loop(&mut terminal, &mut app, provider).await;

    restore_terminal(&mut terminal)?;
    info!("Dashboard closed");
    result
}

async fn event_loop(
    terminal: &mut DashTerminal,
    app: &mut App,
    provider: &dyn KlineProvider,
) -> Result<()> {
    // 첫 화면은 조회 중 상태로 그린 뒤 데이터를 받습니다.
    terminal.draw(|f| ui::draw(f, app))?;
    app.reload(provider).await;

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let action = app.handle_key(key);
        if action == Action::Refetch {
            app.status = app::Status::loading(&app.request);
            terminal.draw(|f| ui::draw(f, app))?;
        }
        if !app.apply(action, provider).await {
            return Ok(());
        }
    }
}
