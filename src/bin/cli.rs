//! wiki-edits CLI
//!
//! Extracts one day of Wikipedia recent changes into DuckDB.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use wiki_edits::{
    error::{AppError, Result},
    models::Config,
    pipeline::{self, WindowPlanner},
    services::ChangeFeedClient,
    storage::{DuckDbPublisher, TableTarget},
    utils::log as logging,
};

/// wiki-edits - Daily Wikipedia recent changes extract
#[derive(Parser, Debug)]
#[command(
    name = "wiki-edits",
    version,
    about = "Extract a day of Wikipedia recent changes into DuckDB"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "wiki_edits.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a day and replace the target table
    Run {
        /// Target day, YYYY-MM-DD (default: yesterday, UTC)
        #[arg(long)]
        date: Option<String>,

        /// Override api.window_size_secs
        #[arg(long)]
        window_size: Option<i64>,

        /// Override storage.database_path
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Show the windows a run would request, without fetching
    Plan {
        /// Target day, YYYY-MM-DD (default: yesterday, UTC)
        #[arg(long)]
        date: Option<String>,

        /// Override api.window_size_secs
        #[arg(long)]
        window_size: Option<i64>,
    },

    /// Publish a staged day again without re-extracting
    Publish {
        /// Staged day, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Override storage.database_path
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Resolve `--date`, defaulting to yesterday in UTC.
fn target_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(input) => Ok(pipeline::parse_target_date(input)?),
        None => Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| AppError::config("cannot compute yesterday's date")),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = Config::load_optional(&cli.config)?;
    let from_file = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logging::init(level, config.logging.file.as_deref().map(Path::new))?;

    log::info!("wiki-edits starting...");
    if from_file {
        log::info!("Loaded configuration from {}", cli.config.display());
    } else {
        log::warn!(
            "No configuration at {}, using defaults",
            cli.config.display()
        );
    }

    if let Err(e) = execute(cli.command, &mut config).await {
        log::error!("Error: {}", e);
        return Err(e);
    }

    log::info!("Done!");
    Ok(())
}

async fn execute(command: Command, config: &mut Config) -> Result<()> {
    match command {
        Command::Run {
            date,
            window_size,
            database,
        } => {
            if let Some(size) = window_size {
                config.api.window_size_secs = size;
            }
            if let Some(path) = database {
                config.storage.database_path = path.display().to_string();
            }
            let date = target_date(date.as_deref())?;
            config.validate()?;

            log::info!("API pipeline has started for {}", date);
            let client = ChangeFeedClient::new(Arc::new(config.api.clone()))?;
            let publisher = Arc::new(DuckDbPublisher::new(&config.storage.database_path));

            let report = pipeline::run_pipeline(config, date, &client, publisher).await?;

            log::info!("[SUMMARY] Run for {}", report.stats.date);
            for (key, value) in report.stats.summary() {
                log::info!("    {}: {}", key, value);
            }
            if let Some(path) = &report.staged {
                log::info!("    staged: {}", path.display());
            }
            log::info!(
                "API pipeline has successfully completed: {} rows in {}",
                report.publish.rows_written,
                report.publish.target
            );
        }

        Command::Plan { date, window_size } => {
            if let Some(size) = window_size {
                config.api.window_size_secs = size;
            }
            let date = target_date(date.as_deref())?;
            let planner = WindowPlanner::new(date, config.api.window_size_secs)?;

            log::info!(
                "{} windows of {}s for {}",
                planner.window_count(),
                config.api.window_size_secs,
                date
            );
            let mut windows = planner.windows();
            if let Some(first) = windows.next() {
                log::info!("First window: {}", first);
            }
            if let Some(last) = windows.last() {
                log::info!("Last window:  {} ({}s)", last, last.width_secs());
            }
        }

        Command::Publish { date, database } => {
            if let Some(path) = database {
                config.storage.database_path = path.display().to_string();
            }
            let date = pipeline::parse_target_date(&date)?;
            let publisher = Arc::new(DuckDbPublisher::new(&config.storage.database_path));

            let summary = pipeline::run_publish_staged(config, date, publisher).await?;
            log::info!(
                "Published {} staged rows to {}",
                summary.rows_written,
                summary.target
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e.into());
            }
            log::info!("✓ Config OK");
            log::info!("    endpoint: {}", config.api.base_url);
            log::info!("    window size: {}s", config.api.window_size_secs);
            log::info!("    per-request limit: {}", config.api.limit);
            log::info!("    max concurrent: {}", config.api.max_concurrent);
            log::info!(
                "    target: {} in {}",
                TableTarget::from(&config.storage),
                config.storage.database_path
            );
        }
    }

    Ok(())
}
