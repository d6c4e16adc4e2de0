// src/services/accumulator.rs

//! Accumulates per-window batches into one edit history table.

use crate::models::{EditHistoryTable, EditRecord, RecordBatch};

/// Owns the growing table for a single run.
///
/// Construct once, [`merge`](Self::merge) every batch in window order, then
/// [`finalize`](Self::finalize). Merging the same batch twice duplicates its
/// rows; windows never overlap, so duplicates point at a planner bug.
#[derive(Debug, Default)]
pub struct EditHistoryAccumulator {
    records: Vec<EditRecord>,
    batches: usize,
    dropped_rows: usize,
    out_of_window_rows: usize,
}

impl EditHistoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce a batch into `EditRecord`s and append them.
    ///
    /// Rows that are not JSON objects are dropped with a warning. Rows whose
    /// timestamp lies outside the producing window are kept but counted.
    pub fn merge(&mut self, batch: RecordBatch) {
        let RecordBatch { window, rows } = batch;
        self.records.reserve(rows.len());

        for row in rows {
            let Some(record) = EditRecord::from_value(&row) else {
                self.dropped_rows += 1;
                log::warn!("Dropping unparseable row in window {}: {}", window, row);
                continue;
            };

            if let Some(ts) = record.timestamp {
                if !window.contains(ts) {
                    self.out_of_window_rows += 1;
                    log::warn!(
                        "Record '{}' at {} is outside window {}",
                        record.title.as_deref().unwrap_or(""),
                        ts,
                        window
                    );
                }
            }

            self.records.push(record);
        }

        self.batches += 1;
        log::info!("Current total records: {}", self.records.len());
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn out_of_window_rows(&self) -> usize {
        self.out_of_window_rows
    }

    /// Hand over the accumulated table.
    pub fn finalize(self) -> EditHistoryTable {
        EditHistoryTable::new(self.records)
    }
}
