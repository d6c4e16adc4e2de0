//! Batches, the accumulated edit table, and run statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EditRecord, WindowSpec};

/// Raw rows returned for one window, not yet coerced into `EditRecord`s.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    pub window: WindowSpec,
    pub rows: Vec<Value>,
}

impl RecordBatch {
    pub fn new(window: WindowSpec, rows: Vec<Value>) -> Self {
        Self { window, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Edit records for one day, in window order then arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditHistoryTable {
    records: Vec<EditRecord>,
}

impl EditHistoryTable {
    pub fn new(records: Vec<EditRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[EditRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Summary of one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub window_count: usize,
    pub record_count: usize,
    pub dropped_rows: usize,
    pub out_of_window_rows: usize,
}

impl RunStats {
    pub fn elapsed_secs(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Key/value pairs for the end-of-run log summary.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("date", self.date.to_string()),
            ("windows", self.window_count.to_string()),
            ("records", self.record_count.to_string()),
            ("dropped rows", self.dropped_rows.to_string()),
            ("out-of-window rows", self.out_of_window_rows.to_string()),
            ("elapsed", format!("{}s", self.elapsed_secs())),
        ]
    }
}
