//! Storage for the finished edit history table.
//!
//! - `DuckDbPublisher`: full replace-load into `schema.table` of a DuckDB file
//! - `StagingArea`: JSON snapshot written before publishing, so a failed
//!   publish can be retried without re-extracting the day
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── wikipedia.db                 # DuckDB store, iv.wiki_edits
//! └── staging/
//!     └── edits-2024-10-31.json    # Staged table for one day
//! ```

pub mod duckdb;
pub mod staging;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::PublishError;
use crate::models::{EditHistoryTable, StorageConfig};

// Re-export for convenience
pub use self::duckdb::DuckDbPublisher;
pub use staging::{StagedTable, StagingArea};

/// Destination table inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub schema: String,
    pub table: String,
}

impl TableTarget {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Quoted `"schema"."table"` for SQL.
    pub fn qualified(&self) -> String {
        format!("\"{}\".\"{}\"", self.schema, self.table)
    }
}

impl From<&StorageConfig> for TableTarget {
    fn from(config: &StorageConfig) -> Self {
        Self::new(&config.schema, &config.table)
    }
}

impl fmt::Display for TableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Metadata about a publish operation.
#[derive(Debug, Clone)]
pub struct PublishSummary {
    pub target: TableTarget,
    pub rows_written: usize,
    pub timestamp: DateTime<Utc>,
}

/// Trait for analytical store backends.
pub trait TablePublisher: Send + Sync {
    /// Replace `target` with the projected rows of `table`.
    ///
    /// Either the whole table is replaced or the store is left untouched.
    fn publish(
        &self,
        table: &EditHistoryTable,
        target: &TableTarget,
    ) -> Result<PublishSummary, PublishError>;
}
