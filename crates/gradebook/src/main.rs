mod config;
mod grades;
mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use gradebook_db::{DatabaseSource, GradeStore};
use gradebook_logging::LogFormat;

use crate::config::AppConfig;
use crate::grades::{handle_grades_command, GradesAction};

#[derive(Parser, Debug)]
#[command(
    name = "gradebook",
    about = "Record and edit student grades",
    version,
    author
)]
struct Cli {
    /// Database file (default: platform data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: ~/.config/gradebook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tracing level (e.g. warn, info, debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatChoice>,

    #[command(subcommand)]
    action: GradesAction,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    let level = config.log_level(cli.log_level.as_deref());
    let format = config.log_format(cli.log_format.map(Into::into));
    let _log_guard = match config.log_dir {
        Some(ref dir) => Some(
            gradebook_logging::init_tracing_with_file(level, format, dir)
                .with_context(|| format!("Failed to set up log directory {}", dir.display()))?,
        ),
        None => {
            gradebook_logging::init_tracing(level, format);
            None
        }
    };

    let db_path = config.database_path(cli.db.as_deref());
    tracing::debug!(path = %db_path.display(), "using grades database");

    // Open before the first command so failures surface up front.
    let store = GradeStore::new(DatabaseSource::Path(db_path.clone()));
    store
        .open()
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    handle_grades_command(&store, cli.action).await
}
