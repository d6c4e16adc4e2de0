// src/pipeline/extract.rs

//! Tumbling-window extraction loop.

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{EditHistoryTable, RunStats};
use crate::pipeline::window::WindowPlanner;
use crate::services::{ChangeSource, EditHistoryAccumulator};

/// Table and statistics produced by one extraction.
#[derive(Debug)]
pub struct Extraction {
    pub table: EditHistoryTable,
    pub stats: RunStats,
}

/// Fetch every window of the planned day and accumulate the results.
///
/// Up to `max_concurrent` requests run at once, but batches are merged strictly
/// in window order, so the table is identical to a sequential run. The first
/// failing window aborts the extraction.
pub async fn run_extraction(
    source: &dyn ChangeSource,
    planner: &WindowPlanner,
    date: NaiveDate,
    max_concurrent: usize,
) -> Result<Extraction> {
    let started_at = Utc::now();
    let window_count = planner.window_count();
    let concurrency = max_concurrent.max(1);

    log::info!(
        "Extracting {} windows for {} ({} in flight)",
        window_count,
        date,
        concurrency
    );

    let mut accumulator = EditHistoryAccumulator::new();
    let mut batches = stream::iter(planner.windows().enumerate())
        .map(|(index, window)| async move {
            log::info!(
                "Window {}/{}: {} -> {}",
                index + 1,
                window_count,
                window.rcend(),
                window.rcstart()
            );
            source.fetch(&window).await
        })
        .buffered(concurrency);

    while let Some(result) = batches.next().await {
        accumulator.merge(result?);
    }
    if accumulator.is_empty() {
        log::warn!("No recent changes returned for {}", date);
    }

    let dropped_rows = accumulator.dropped_rows();
    let out_of_window_rows = accumulator.out_of_window_rows();
    let table = accumulator.finalize();

    let stats = RunStats {
        date,
        started_at,
        finished_at: Utc::now(),
        window_count,
        record_count: table.len(),
        dropped_rows,
        out_of_window_rows,
    };

    Ok(Extraction { table, stats })
}
