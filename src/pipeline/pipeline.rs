// src/pipeline/pipeline.rs

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{Config, EditHistoryTable, RunStats};
use crate::services::ChangeSource;
use crate::storage::{PublishSummary, StagingArea, TablePublisher, TableTarget};

use super::extract::run_extraction;
use super::window::WindowPlanner;

/// Outcome of a full run.
#[derive(Debug)]
pub struct RunReport {
    pub stats: RunStats,
    pub staged: Option<PathBuf>,
    pub publish: PublishSummary,
}

/// Run the full pipeline: plan, extract every window, stage, publish.
///
/// Nothing reaches the store unless every window was fetched.
pub async fn run_pipeline(
    config: &Config,
    date: NaiveDate,
    source: &dyn ChangeSource,
    publisher: Arc<dyn TablePublisher>,
) -> Result<RunReport> {
    config.validate()?;
    let planner = WindowPlanner::new(date, config.api.window_size_secs)?;

    log::info!("Step 1/3: Extracting recent changes for {}", date);
    let extraction = run_extraction(source, &planner, date, config.api.max_concurrent).await?;

    log::info!("Step 2/3: Staging {} records", extraction.table.len());
    let staged = match &config.storage.staging_dir {
        Some(dir) => Some(StagingArea::new(dir).write(date, &extraction.table).await?),
        None => {
            log::info!("No staging directory configured, skipping");
            None
        }
    };

    let target = TableTarget::from(&config.storage);
    log::info!("Step 3/3: Publishing to {}", target);
    let publish = publish_blocking(publisher, extraction.table, target).await?;

    Ok(RunReport {
        stats: extraction.stats,
        staged,
        publish,
    })
}

/// Publish a previously staged day without extracting again.
pub async fn run_publish_staged(
    config: &Config,
    date: NaiveDate,
    publisher: Arc<dyn TablePublisher>,
) -> Result<PublishSummary> {
    config.validate()?;
    let dir = config
        .storage
        .staging_dir
        .as_ref()
        .ok_or_else(|| crate::error::AppError::config("storage.staging_dir is not set"))?;

    let staged = StagingArea::new(dir).require(date).await?;
    log::info!(
        "Loaded {} staged records for {} (staged at {})",
        staged.count,
        staged.date,
        staged.staged_at
    );

    let target = TableTarget::from(&config.storage);
    publish_blocking(publisher, staged.table, target).await
}

/// Run the synchronous store write on the blocking thread pool.
async fn publish_blocking(
    publisher: Arc<dyn TablePublisher>,
    table: EditHistoryTable,
    target: TableTarget,
) -> Result<PublishSummary> {
    let summary =
        tokio::task::spawn_blocking(move || publisher.publish(&table, &target)).await??;
    Ok(summary)
}
