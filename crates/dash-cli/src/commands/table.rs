//! `table` 명령어: 데이터 테이블 CSV 내보내기 (최신 행 먼저).

use anyhow::{Context, Result};
use dash_analytics::IndicatorEngine;
use dash_exchange::KlineProvider;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use tracing::info;

use super::load::{fetch_frame_with_spinner, LoadRequest};

/// 데이터를 조회하고 CSV로 씁니다. `output`이 없으면 표준 출력.
pub async fn run(
    provider: &dyn KlineProvider,
    request: &LoadRequest,
    output: Option<&Path>,
) -> Result<()> {
    let engine = IndicatorEngine::new();
    let frame = fetch_frame_with_spinner(provider, request, &engine).await?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            frame.write_csv(BufWriter::new(file))?;
            info!(path = %path.display(), rows = frame.len(), "Data table written");
            println!("Saved {} rows to {}", frame.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            frame.write_csv(stdout.lock())?;
        }
    }
    Ok(())
}
