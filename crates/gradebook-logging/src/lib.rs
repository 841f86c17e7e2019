//! # gradebook-logging
//!
//! Tracing setup for gradebook.
//!
//! ## Log Formats
//!
//! - `Pretty` - Human-readable multi-field output
//! - `JSON` - Structured JSON lines
//! - `Compact` - Minimal text output
//!
//! Console output always goes to stderr so command output on stdout stays
//! clean. An optional daily-rolling file sink writes JSON lines.

use std::path::Path;

use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix for the rolling log file.
pub const LOG_FILE_PREFIX: &str = "gradebook.log";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = env_filter(level);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

/// Daily-rolling appender in `log_dir`, creating the directory if needed.
fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
}

/// Initialize tracing with console output plus JSON lines written to a
/// daily-rolling file in `log_dir`.
///
/// Fails without installing a subscriber if the log directory cannot be
/// created. The returned guard flushes the file writer on drop; keep it alive
/// for the lifetime of the program.
pub fn init_tracing_with_file(
    level: &str,
    format: LogFormat,
    log_dir: &Path,
) -> Result<WorkerGuard, InitError> {
    let appender = file_appender(log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer().json().with_ansi(false).with_writer(writer);

    let json = (format == LogFormat::Json)
        .then(|| fmt::layer().json().with_target(false).with_writer(std::io::stderr));
    let pretty = (format == LogFormat::Pretty)
        .then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let compact = (format == LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file_layer)
        .with(json)
        .with(pretty)
        .with(compact)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        format: LogFormat,
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_deserialize_log_format() {
        let wrapper: Wrapper = toml::from_str(r#"format = "compact""#).unwrap();
        assert_eq!(wrapper.format, LogFormat::Compact);

        assert!(toml::from_str::<Wrapper>(r#"format = "loud""#).is_err());
    }

    #[test]
    fn test_file_appender_creates_log_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");

        assert!(file_appender(&log_dir).is_ok());
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_file_appender_bad_dir_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"").unwrap();

        assert!(file_appender(&file.join("logs")).is_err());
    }

    #[test]
    fn test_init_with_bad_dir_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"").unwrap();

        let result = init_tracing_with_file("warn", LogFormat::Pretty, &file.join("logs"));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_is_pretty() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
