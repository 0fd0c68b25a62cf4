//! tracing을 사용한 로깅 인프라.
//!
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: 로그 수집용 JSON 형식
//! - **compact**: 간결한 한 줄 형식
//!
//! 터미널 대시보드는 화면을 직접 그리므로 로그를 파일로 보냅니다.

use crate::config::LoggingConfig;
use crate::error::{DashError, DashResult};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식
    #[default]
    Pretty,
    /// JSON 형식
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로그 출력 대상.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// 표준 에러
    Stderr,
    /// 파일 (추가 모드)
    File(PathBuf),
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "dash_exchange=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 출력 대상
    pub target: LogTarget,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            target: LogTarget::Stderr,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// 애플리케이션 설정의 `[logging]` 섹션에서 생성합니다.
    ///
    /// `to_file`이 false이면 파일 설정을 무시하고 표준 에러로 출력합니다.
    pub fn from_settings(settings: &LoggingConfig, to_file: bool) -> Self {
        let format = settings.format.parse().unwrap_or_default();
        let target = match (&settings.file, to_file) {
            (Some(path), true) => LogTarget::File(PathBuf::from(path)),
            _ => LogTarget::Stderr,
        };

        Self {
            level: settings.level.clone(),
            format,
            target,
            with_target: true,
        }
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 설정 파일의 레벨보다 우선합니다.
pub fn init_logging(config: LogConfig) -> DashResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| DashError::Logging(e.to_string()))?;

    let (writer, ansi) = match &config.target {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DashError::Logging(format!("{}: {}", path.display(), e)))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(ansi)
                    .with_writer(writer)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(ansi)
                    .with_writer(writer)
                    .with_target(config.with_target),
            )
            .try_init(),
    };
    result.map_err(|e| DashError::Logging(e.to_string()))?;

    tracing::info!(
        format = ?config.format,
        level = %config.level,
        target = ?config.target,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_from_settings_respects_file_flag() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
            file: Some("dash.log".to_string()),
        };

        let tui = LogConfig::from_settings(&settings, true);
        assert_eq!(tui.target, LogTarget::File(PathBuf::from("dash.log")));
        assert_eq!(tui.format, LogFormat::Json);

        let cli = LogConfig::from_settings(&settings, false);
        assert_eq!(cli.target, LogTarget::Stderr);
        assert_eq!(cli.level, "debug");
    }
}
