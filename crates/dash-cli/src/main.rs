//! 암호화폐 기술적 분석 대시보드 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 대화형 대시보드 (기본)
//! dash
//! dash dashboard -s ETHUSDT -i 4h
//!
//! # 요약 패널만 출력
//! dash summary -s BTCUSDT --start 2024-01-01
//!
//! # 방향 예측 (학습 윈도우 120, 10봉 예측)
//! dash predict -s SOLUSDT -w 120 -H 10
//!
//! # 데이터 테이블 CSV 저장
//! dash table -s BTCUSDT -o btc.csv
//! ```

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dash_core::{init_logging, AppConfig, LogConfig, Timeframe};
use std::path::PathBuf;
use tracing::{error, info};

use dash_cli::commands::load::{binance_client, LoadRequest};
use dash_cli::commands::{intervals, predict, summary, table};
use dash_cli::tui;

#[derive(Parser)]
#[command(name = "dash")]
#[command(about = "Crypto technical-analysis dashboard - Binance 캔들 기반 지표/예측", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// 거래 심볼 (예: BTCUSDT)
    #[arg(short, long, global = true)]
    symbol: Option<String>,

    /// 캔들 간격 (1m, 3m, 5m, 15m, 30m, 1h, 2h, 4h, 6h, 8h, 12h, 1d, 3d, 1w, 1M)
    #[arg(short, long, global = true)]
    interval: Option<Timeframe>,

    /// 시작 날짜 (YYYY-MM-DD)
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 대화형 터미널 대시보드 (기본)
    Dashboard,

    /// 수익률/모멘텀/추세 강도 요약 출력
    Summary,

    /// 다음 봉 방향 예측 모델 평가와 미래 봉 예측
    Predict {
        /// 학습 윈도우 (최근 행 수, 30..=365)
        #[arg(short, long)]
        window: Option<usize>,

        /// 예측할 미래 봉 수 (1..=100)
        #[arg(short = 'H', long)]
        horizon: Option<usize>,
    },

    /// 데이터 테이블을 CSV로 출력 (최신 행 먼저)
    Table {
        /// 출력 파일 경로 (없으면 표준 출력)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 지원 간격 목록
    Intervals,
}

impl Cli {
    /// 설정 파일 위에 CLI 플래그를 덮어씁니다.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(symbol) = &self.symbol {
            config.dashboard.symbol = symbol.clone();
        }
        if let Some(interval) = self.interval {
            config.dashboard.interval = interval;
        }
        if let Some(start) = self.start {
            config.dashboard.start_date = Some(start);
        }
        if let Some(Commands::Predict { window, horizon }) = &self.command {
            if let Some(window) = window {
                config.ml.training_window = *window;
            }
            if let Some(horizon) = horizon {
                config.ml.horizon = *horizon;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let command = cli.command.unwrap_or(Commands::Dashboard);
    let to_file = matches!(command, Commands::Dashboard);
    init_logging(LogConfig::from_settings(&config.logging, to_file))?;

    let request = LoadRequest::from_settings(&config.dashboard, Utc::now().date_naive());
    info!(
        symbol = %request.display_symbol(),
        interval = %request.interval,
        start = %request.start_date,
        "Starting dash"
    );

    let result = match command {
        Commands::Dashboard => {
            let client = binance_client(&config.exchange)?;
            tui::run(&config, &client).await
        }
        Commands::Summary => {
            let client = binance_client(&config.exchange)?;
            summary::run(&client, &request).await
        }
        Commands::Predict { .. } => {
            let client = binance_client(&config.exchange)?;
            predict::run(&client, &request, &config.ml).await
        }
        Commands::Table { output } => {
            let client = binance_client(&config.exchange)?;
            table::run(&client, &request, output.as_deref()).await
        }
        Commands::Intervals => {
            intervals::run();
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}
